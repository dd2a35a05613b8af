//! Animations discovered on a page, as listed by the popup.

use crate::settings::PreviewMode;
use lottie_data::model::{DocumentSummary, LottieJson};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundAnimation {
    pub lottie_url: String,
    pub file_name: String,
    pub was_dot_lottie: bool,
    /// Known once the JSON has been fetched; packaged bundles never have one.
    #[serde(default)]
    pub summary: Option<DocumentSummary>,
}

impl FoundAnimation {
    pub fn from_url(lottie_url: &str) -> Self {
        let path = lottie_url.split(['?', '#']).next().unwrap_or(lottie_url);
        let file_name = path.rsplit('/').next().unwrap_or(path).to_string();
        Self {
            lottie_url: lottie_url.to_string(),
            was_dot_lottie: file_name.ends_with(".lottie"),
            file_name,
            summary: None,
        }
    }

    pub fn with_document(mut self, doc: &LottieJson) -> Self {
        self.summary = Some(doc.summary());
        self
    }

    /// Identity used for selection and download tracking.
    pub fn item_id(&self, index: usize) -> String {
        if !self.lottie_url.is_empty() {
            self.lottie_url.clone()
        } else if !self.file_name.is_empty() {
            self.file_name.clone()
        } else {
            format!("lottie-item-{}", index)
        }
    }

    pub fn display_name(&self) -> &str {
        self.summary
            .as_ref()
            .and_then(|s| s.name.as_deref())
            .or(Some(self.file_name.as_str()).filter(|n| !n.is_empty()))
            .unwrap_or("Lottie Animation")
    }

    pub fn tag(&self) -> &'static str {
        if self.was_dot_lottie {
            ".lottie"
        } else {
            ".json"
        }
    }

    pub fn matches(&self, mode: PreviewMode) -> bool {
        match mode {
            PreviewMode::All => true,
            PreviewMode::Lottie => self.was_dot_lottie,
            PreviewMode::Json => !self.was_dot_lottie,
        }
    }
}

/// The popup's list plus its selection and the set downloaded this session.
#[derive(Debug, Default)]
pub struct Catalog {
    items: Vec<FoundAnimation>,
    selected: Vec<String>,
    downloaded: HashSet<String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an item unless one with the same id is already listed.
    pub fn add(&mut self, item: FoundAnimation) -> bool {
        let id = item.item_id(self.items.len());
        if self.items.iter().enumerate().any(|(i, known)| known.item_id(i) == id) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn items(&self) -> &[FoundAnimation] {
        &self.items
    }

    pub fn filtered(&self, mode: PreviewMode) -> Vec<&FoundAnimation> {
        self.items.iter().filter(|item| item.matches(mode)).collect()
    }

    pub fn set_selected(&mut self, id: &str, selected: bool) {
        if selected {
            if !self.selected.iter().any(|s| s == id) {
                self.selected.push(id.to_string());
            }
        } else {
            self.selected.retain(|s| s != id);
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s == id)
    }

    /// Selected items in selection order; ids no longer listed are skipped.
    pub fn selected_items(&self) -> Vec<&FoundAnimation> {
        self.selected
            .iter()
            .filter_map(|id| {
                self.items
                    .iter()
                    .enumerate()
                    .find(|(i, item)| item.item_id(*i) == *id)
                    .map(|(_, item)| item)
            })
            .collect()
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn mark_downloaded(&mut self, id: &str) {
        self.downloaded.insert(id.to_string());
    }

    pub fn is_downloaded(&self, id: &str) -> bool {
        self.downloaded.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_url() {
        let item = FoundAnimation::from_url("https://cdn.example.com/a/b/spinner.lottie?v=3");
        assert_eq!(item.file_name, "spinner.lottie");
        assert!(item.was_dot_lottie);
        assert_eq!(item.tag(), ".lottie");
        assert_eq!(item.display_name(), "spinner.lottie");
    }

    #[test]
    fn test_item_id_fallbacks() {
        let mut item = FoundAnimation::from_url("");
        assert_eq!(item.item_id(4), "lottie-item-4");
        assert_eq!(item.display_name(), "Lottie Animation");
        item.file_name = "x.json".to_string();
        assert_eq!(item.item_id(4), "x.json");
    }

    #[test]
    fn test_summary_name_wins() {
        let doc = LottieJson::from_value(json!({
            "nm": "Loader", "fr": 24, "ip": 0, "op": 48, "w": 64, "h": 64, "layers": []
        }))
        .unwrap();
        let item = FoundAnimation::from_url("https://x.test/loader.json").with_document(&doc);
        assert_eq!(item.display_name(), "Loader");
        assert_eq!(item.summary.as_ref().unwrap().num_frames, 48.0);
    }

    #[test]
    fn test_filter_select_and_track() {
        let mut catalog = Catalog::new();
        assert!(catalog.add(FoundAnimation::from_url("https://x.test/a.json")));
        assert!(catalog.add(FoundAnimation::from_url("https://x.test/b.lottie")));
        assert!(!catalog.add(FoundAnimation::from_url("https://x.test/a.json")));

        assert_eq!(catalog.filtered(PreviewMode::All).len(), 2);
        assert_eq!(catalog.filtered(PreviewMode::Json)[0].file_name, "a.json");
        assert_eq!(catalog.filtered(PreviewMode::Lottie)[0].file_name, "b.lottie");

        catalog.set_selected("https://x.test/b.lottie", true);
        catalog.set_selected("https://x.test/a.json", true);
        catalog.set_selected("https://x.test/a.json", true);
        let names: Vec<_> = catalog.selected_items().iter().map(|i| i.file_name.as_str()).collect();
        assert_eq!(names, vec!["b.lottie", "a.json"]);

        catalog.set_selected("https://x.test/b.lottie", false);
        assert!(!catalog.is_selected("https://x.test/b.lottie"));

        catalog.mark_downloaded("https://x.test/a.json");
        assert!(catalog.is_downloaded("https://x.test/a.json"));
        assert!(!catalog.is_downloaded("https://x.test/b.lottie"));
    }
}
