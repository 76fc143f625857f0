use std::{collections::HashMap, fs, path::Path, str::FromStr};

use serde_json::{json, Map, Value};
use tokenizers::Tokenizer;

use super::ClassifierError;

/// A complete `tokenizers` file in the artifact directory
pub static TOKENIZER_FILE: &str = "tokenizer.json";

/// A flat `{word: id}` map exported from the fitted Keras tokenizer
pub static WORD_INDEX_FILE: &str = "word_index.json";

/// Reserved token that out-of-vocabulary words resolve to before they are dropped
pub static UNK_TOKEN: &str = "[UNK]";

/// Characters replaced with a space by the Keras tokenizer before splitting on spaces
static KERAS_FILTERS: &str = r##"[!"#$%&()*+,\-./:;<=>?@\[\\\]^_`{|}~\t\n]"##;

/// The fitted vocabulary, mapping titles to token ids.
///
/// Immutable once built. Unknown words and ids past `vocab_size` are dropped rather than
/// mapped, which is how the training sequences were produced.
#[derive(Clone)]
pub struct Vocabulary {
    /// Tokenizer holding the normalization rules and the word index
    tokenizer: Tokenizer,

    /// Largest id the embedding table has a row for
    vocab_size: usize,

    /// ID of the UNK token, when the tokenizer defines one
    unk_token_id: Option<u32>,
}

impl Vocabulary {
    /// Wrap an existing tokenizer
    pub fn new(tokenizer: Tokenizer, vocab_size: usize) -> Self {
        let unk_token_id = tokenizer.token_to_id(UNK_TOKEN);

        Self {
            tokenizer,
            vocab_size,
            unk_token_id,
        }
    }

    /// Build a word-level tokenizer with the Keras normalization rules around a word index
    pub fn from_word_index(
        word_index: HashMap<String, u32>,
        vocab_size: usize,
    ) -> Result<Self, ClassifierError> {
        let mut vocab: Map<String, Value> = word_index
            .into_iter()
            .map(|(word, id)| (word, json!(id)))
            .collect();

        // Id 0 is never produced by Keras, and is dropped like padding
        vocab.insert(UNK_TOKEN.to_string(), json!(0));

        let definition = json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [],
            "normalizer": {
                "type": "Sequence",
                "normalizers": [
                    { "type": "Lowercase" },
                    {
                        "type": "Replace",
                        "pattern": { "Regex": KERAS_FILTERS },
                        "content": " "
                    }
                ]
            },
            // Only plain spaces separate words, so `\u{a0}` or `\r` stay inside a token
            "pre_tokenizer": {
                "type": "Split",
                "pattern": { "String": " " },
                "behavior": "Removed",
                "invert": false
            },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": vocab,
                "unk_token": UNK_TOKEN
            }
        });

        let tokenizer = Tokenizer::from_str(&definition.to_string())
            .map_err(|e| ClassifierError::artifact(WORD_INDEX_FILE, e))?;

        Ok(Self::new(tokenizer, vocab_size))
    }

    /// Load the vocabulary from an artifact directory, preferring a full tokenizer file
    pub fn load(artifact_dir: &Path, vocab_size: usize) -> Result<Self, ClassifierError> {
        let tokenizer_file = artifact_dir.join(TOKENIZER_FILE);

        if tokenizer_file.exists() {
            log::info!("Loading tokenizer from {}", tokenizer_file.display());

            let tokenizer = Tokenizer::from_file(&tokenizer_file)
                .map_err(|e| ClassifierError::artifact(&tokenizer_file, e))?;

            return Ok(Self::new(tokenizer, vocab_size));
        }

        let word_index_file = artifact_dir.join(WORD_INDEX_FILE);

        log::info!("Loading word index from {}", word_index_file.display());

        let contents = fs::read_to_string(&word_index_file)
            .map_err(|e| ClassifierError::artifact(&word_index_file, e))?;

        let word_index: HashMap<String, u32> = serde_json::from_str(&contents)
            .map_err(|e| ClassifierError::artifact(&word_index_file, e))?;

        Self::from_word_index(word_index, vocab_size)
    }

    /// Map a title to its token ids. Empty or unparseable text gives an empty sequence.
    pub fn tokenize(&self, text: &str) -> Vec<usize> {
        let encoding = match self.tokenizer.encode(text, false) {
            Ok(encoding) => encoding,
            Err(e) => {
                log::warn!("Unable to tokenize {:?}: {}", text, e);

                return Vec::new();
            }
        };

        encoding
            .get_ids()
            .iter()
            .filter(|id| Some(**id) != self.unk_token_id)
            .map(|id| *id as usize)
            .filter(|id| *id != 0 && *id <= self.vocab_size)
            .collect()
    }
}
