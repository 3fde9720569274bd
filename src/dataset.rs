//! # Phoneme Reference Dataset
//!
//! Read-only reference data the drill runs against: for each selectable
//! sound, the example word the learner is prompted with, its IPA
//! pronunciation, remedial articulation instructions, and an illustrative
//! image. Loaded once at startup, either from the built-in table below or
//! from a TOML file named in the configuration.
//!
//! Every selectable symbol must carry a non-empty example word; a dataset
//! that violates this fails validation and the server refuses to start.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Fallback instruction used when a sound has no registered remedy.
pub const DEFAULT_REMEDY: &str = "Practice the pronunciation more carefully.";

/// Reference data for a single selectable sound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhonemeEntry {
    /// Example word the learner is asked to pronounce
    pub word: String,

    /// IPA pronunciation of the example word (may be empty)
    #[serde(default)]
    pub pronunciation: String,

    /// Ordered articulation instructions shown when scores are low
    #[serde(default)]
    pub remedy: Vec<String>,

    /// Illustrative image URL for the example word (may be empty)
    #[serde(default)]
    pub image: String,
}

impl PhonemeEntry {
    /// The remedy instructions for this sound, falling back to the generic
    /// practice message when none are registered.
    pub fn remedy_instructions(&self) -> Vec<String> {
        if self.remedy.is_empty() {
            vec![DEFAULT_REMEDY.to_string()]
        } else {
            self.remedy.clone()
        }
    }
}

/// The full phoneme table plus the ordered list of letters advertised to
/// clients. `letters` is a subset of the entry keys: alternate prompts like
/// `B2` are selectable but not listed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhonemeDataset {
    pub letters: Vec<String>,
    pub entries: HashMap<String, PhonemeEntry>,
}

impl PhonemeDataset {
    /// Load a dataset from a TOML file, validating it before use.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read phoneme dataset from {}", path.display()))?;
        let dataset: PhonemeDataset = toml::from_str(&raw)
            .with_context(|| format!("Invalid phoneme dataset in {}", path.display()))?;
        dataset.validate()?;
        Ok(dataset)
    }

    /// Look up the entry for a symbol, if it is selectable.
    pub fn get(&self, symbol: &str) -> Option<&PhonemeEntry> {
        self.entries.get(symbol)
    }

    /// Map of symbol to example word, for the letters listing.
    pub fn example_words(&self) -> HashMap<&str, &str> {
        self.entries
            .iter()
            .map(|(symbol, entry)| (symbol.as_str(), entry.word.as_str()))
            .collect()
    }

    /// Check the dataset invariants:
    /// - every entry has a non-empty example word
    /// - every advertised letter has an entry
    pub fn validate(&self) -> Result<()> {
        for (symbol, entry) in &self.entries {
            if entry.word.trim().is_empty() {
                return Err(anyhow!("Phoneme '{}' has no example word", symbol));
            }
        }

        for letter in &self.letters {
            if !self.entries.contains_key(letter) {
                return Err(anyhow!("Advertised letter '{}' has no dataset entry", letter));
            }
        }

        Ok(())
    }
}

impl Default for PhonemeDataset {
    fn default() -> Self {
        let mut entries = HashMap::new();

        entries.insert(
            "S".to_string(),
            PhonemeEntry {
                word: "sunday".to_string(),
                pronunciation: "sʌn.deɪ".to_string(),
                remedy: vec![
                    "Keep your teeth close together to make the sound. The ridge right behind your two front teeth is involved. The front of your tongue is used. Vocal cords don’t vibrate for voiceless sounds.".to_string(),
                ],
                image: "https://cdn-icons-png.flaticon.com/512/1995/1995471.png".to_string(),
            },
        );

        entries.insert(
            "F".to_string(),
            PhonemeEntry {
                word: "free".to_string(),
                pronunciation: "friː".to_string(),
                remedy: vec![
                    "Place your bottom lip against your upper front teeth. Top teeth may be on your bottom lip.".to_string(),
                ],
                image: "https://cdn-icons-png.flaticon.com/512/2917/2917995.png".to_string(),
            },
        );

        entries.insert(
            "L".to_string(),
            PhonemeEntry {
                word: "love".to_string(),
                pronunciation: "lʌv".to_string(),
                remedy: vec![
                    "The ridge right behind your two front teeth is involved. The front of your tongue is used.".to_string(),
                ],
                image: "https://cdn-icons-png.flaticon.com/512/1077/1077035.png".to_string(),
            },
        );

        entries.insert(
            "B".to_string(),
            PhonemeEntry {
                word: "boat".to_string(),
                pronunciation: "boʊt".to_string(),
                remedy: vec!["Put your lips together to make the sound.".to_string()],
                image: "https://upload.wikimedia.org/wikipedia/commons/thumb/d/d3/Soccerball.svg/500px-Soccerball.svg.png".to_string(),
            },
        );

        // Alternate prompt for the B sound; selectable but not advertised
        entries.insert(
            "B2".to_string(),
            PhonemeEntry {
                word: "ball".to_string(),
                pronunciation: "bɔːl".to_string(),
                remedy: vec!["Put your lips together to make the sound.".to_string()],
                image: String::new(),
            },
        );

        entries.insert(
            "P".to_string(),
            PhonemeEntry {
                word: "pen".to_string(),
                pronunciation: "pen".to_string(),
                remedy: vec![
                    "Put your lips together to make the sound. Vocal cords don’t vibrate for voiceless sounds.".to_string(),
                ],
                image: "https://cdn-icons-png.flaticon.com/512/2541/2541979.png".to_string(),
            },
        );

        entries.insert(
            "T".to_string(),
            PhonemeEntry {
                word: "tree".to_string(),
                pronunciation: "triː".to_string(),
                remedy: vec![
                    "The ridge right behind your two front teeth is involved. The front of your tongue is used. Vocal cords don’t vibrate for voiceless sounds.".to_string(),
                ],
                image: "https://cdn-icons-png.flaticon.com/512/628/628283.png".to_string(),
            },
        );

        entries.insert(
            "A".to_string(),
            PhonemeEntry {
                word: "apple".to_string(),
                pronunciation: "ˈæp.əl".to_string(),
                remedy: vec![
                    "Open your mouth wide with your tongue flat at the bottom, as in \"apple\".".to_string(),
                    "Open your mouth wide and pull your tongue back slightly, as in \"father\".".to_string(),
                ],
                image: "https://png.pngtree.com/png-vector/20231017/ourmid/pngtree-fresh-apple-fruit-red-png-image_10203073.png".to_string(),
            },
        );

        entries.insert(
            "Z".to_string(),
            PhonemeEntry {
                word: "zebra".to_string(),
                pronunciation: "ˈziː.brə".to_string(),
                remedy: vec![
                    "Keep your teeth close together to make the sound. The ridge right behind your two front teeth is involved. The front of your tongue is used.".to_string(),
                ],
                image: "https://pngimg.com/uploads/zebra/zebra_PNG95977.png".to_string(),
            },
        );

        Self {
            letters: ["S", "F", "L", "B", "P", "T", "A", "Z"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dataset_is_valid() {
        let dataset = PhonemeDataset::default();
        assert!(dataset.validate().is_ok());
    }

    #[test]
    fn test_every_advertised_letter_is_selectable() {
        let dataset = PhonemeDataset::default();
        for letter in &dataset.letters {
            let entry = dataset.get(letter).expect("advertised letter missing");
            assert!(!entry.word.is_empty());
        }
    }

    #[test]
    fn test_alternate_prompt_selectable_but_not_advertised() {
        let dataset = PhonemeDataset::default();
        assert!(dataset.get("B2").is_some());
        assert!(!dataset.letters.contains(&"B2".to_string()));
        assert_eq!(dataset.get("B2").unwrap().word, "ball");
    }

    #[test]
    fn test_unknown_symbol_has_no_entry() {
        let dataset = PhonemeDataset::default();
        assert!(dataset.get("Q").is_none());
        assert!(dataset.get("").is_none());
    }

    #[test]
    fn test_remedy_falls_back_to_generic_message() {
        let entry = PhonemeEntry {
            word: "pen".to_string(),
            pronunciation: String::new(),
            remedy: Vec::new(),
            image: String::new(),
        };
        assert_eq!(entry.remedy_instructions(), vec![DEFAULT_REMEDY.to_string()]);
    }

    #[test]
    fn test_validation_rejects_empty_example_word() {
        let mut dataset = PhonemeDataset::default();
        dataset.entries.insert(
            "X".to_string(),
            PhonemeEntry {
                word: "  ".to_string(),
                pronunciation: String::new(),
                remedy: Vec::new(),
                image: String::new(),
            },
        );
        assert!(dataset.validate().is_err());
    }

    #[test]
    fn test_dataset_parses_from_toml() {
        let raw = r#"
            letters = ["S"]

            [entries.S]
            word = "sunday"
            pronunciation = "sʌn.deɪ"
            remedy = ["Keep your teeth close together to make the sound."]
        "#;
        let dataset: PhonemeDataset = toml::from_str(raw).unwrap();
        assert!(dataset.validate().is_ok());
        assert_eq!(dataset.get("S").unwrap().word, "sunday");
        assert!(dataset.get("S").unwrap().image.is_empty());
    }
}
