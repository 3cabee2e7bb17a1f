//! Load functionality for trained models.
//!
//! Every structural problem is reported as [`BpeError::CorruptModel`] with the path
//! and 1-based line, so a truncated or hand-edited file never yields a partial model.

use super::format::{version_token, ModelFormat, SerializedModel, FORMAT_VERSION, MAGIC};
use ahash::AHashSet;
use sharif_bpe_core::{BpeError, Model, Pair, Result, SplitPolicy};
use std::path::Path;

/// Model loader - reads and validates model files.
pub struct ModelLoader;

/// Parsed `SharifBPE v1` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Header {
    base: usize,
    vocab: usize,
    merges: usize,
    split: SplitPolicy,
}

impl ModelLoader {
    /// Load a model from `path`, detecting the layout from its content.
    pub fn load(path: &Path) -> Result<Model> {
        let bytes = std::fs::read(path).map_err(|e| BpeError::io(path, e))?;
        let content = String::from_utf8(bytes)
            .map_err(|e| BpeError::corrupt(path, 1, format!("not valid UTF-8: {e}")))?;
        let model = Self::parse(&content, path)?;

        log::info!(
            "Loaded model from {} ({} symbols, {} merges, split={})",
            path.display(),
            model.vocab_size(),
            model.merge_count(),
            model.split_policy()
        );
        Ok(model)
    }

    /// Parse model content; `path` is only used in error messages.
    pub fn parse(content: &str, path: &Path) -> Result<Model> {
        match ModelFormat::detect(content) {
            ModelFormat::Text => Self::parse_text(content, path),
            ModelFormat::Json => Self::parse_json(content, path),
        }
    }

    /// Parse the text layout.
    pub fn parse_text(content: &str, path: &Path) -> Result<Model> {
        let mut lines = content.lines().enumerate().map(|(i, line)| (i + 1, line));

        let (line_no, header) = lines
            .next()
            .ok_or_else(|| BpeError::corrupt(path, 1, "empty file"))?;
        let header = parse_header(header, path, line_no)?;

        let (line_no, base_line) = lines
            .next()
            .ok_or_else(|| BpeError::corrupt(path, 2, "missing base alphabet line"))?;
        let base = parse_base(base_line.split_whitespace(), header.base, path, line_no)?;

        // Every rule line takes at least four bytes; the header count is untrusted.
        let mut merges = Vec::with_capacity(header.merges.min(content.len() / 4));
        for i in 0..header.merges {
            let (line_no, line) = lines.next().ok_or_else(|| {
                BpeError::corrupt(
                    path,
                    3 + i,
                    format!("expected {} merge rules, found {i}", header.merges),
                )
            })?;
            let mut ids = line.split_whitespace().map(str::parse::<u32>);
            let pair = match (ids.next(), ids.next(), ids.next()) {
                (Some(Ok(left)), Some(Ok(right)), None) => (left, right),
                _ => {
                    return Err(BpeError::corrupt(
                        path,
                        line_no,
                        format!("expected two symbol ids, found {line:?}"),
                    ))
                }
            };
            merges.push(pair);
        }

        if let Some((line_no, _)) = lines.next() {
            return Err(BpeError::corrupt(path, line_no, "unexpected trailing content"));
        }

        build_model(base, &merges, header.split, path, |i| 3 + i)
    }

    /// Parse the JSON layout.
    pub fn parse_json(content: &str, path: &Path) -> Result<Model> {
        let record: SerializedModel = serde_json::from_str(content)
            .map_err(|e| BpeError::corrupt(path, e.line().max(1), e.to_string()))?;

        if record.format != MAGIC {
            return Err(BpeError::corrupt(
                path,
                1,
                format!("expected format {MAGIC:?}, found {:?}", record.format),
            ));
        }
        if record.version != FORMAT_VERSION {
            return Err(BpeError::VersionMismatch {
                path: path.to_path_buf(),
                found: version_token(record.version),
                supported: version_token(FORMAT_VERSION),
            });
        }

        let base = distinct_base(record.base, path, 1)?;
        build_model(base, &record.merges, record.split, path, |_| 1)
    }
}

fn parse_header(line: &str, path: &Path, line_no: usize) -> Result<Header> {
    let mut tokens = line.split_whitespace();

    match tokens.next() {
        Some(MAGIC) => {}
        found => {
            return Err(BpeError::corrupt(
                path,
                line_no,
                format!("expected {MAGIC:?} header, found {:?}", found.unwrap_or("")),
            ))
        }
    }

    let supported = version_token(FORMAT_VERSION);
    match tokens.next() {
        Some(version) if version == supported => {}
        Some(version) if version.starts_with('v') => {
            return Err(BpeError::VersionMismatch {
                path: path.to_path_buf(),
                found: version.to_string(),
                supported,
            })
        }
        found => {
            return Err(BpeError::corrupt(
                path,
                line_no,
                format!("expected version token, found {:?}", found.unwrap_or("")),
            ))
        }
    }

    let (mut base, mut vocab, mut merges) = (None, None, None);
    let mut split = SplitPolicy::default();
    for token in tokens {
        let (key, value) = token.split_once('=').ok_or_else(|| {
            BpeError::corrupt(path, line_no, format!("malformed header field {token:?}"))
        })?;
        let number = || {
            value.parse::<usize>().map_err(|_| {
                BpeError::corrupt(path, line_no, format!("{key} is not a number: {value:?}"))
            })
        };
        match key {
            "base" => base = Some(number()?),
            "vocab" => vocab = Some(number()?),
            "merges" => merges = Some(number()?),
            "split" => {
                split = value
                    .parse()
                    .map_err(|e: BpeError| BpeError::corrupt(path, line_no, e.to_string()))?
            }
            other => {
                return Err(BpeError::corrupt(
                    path,
                    line_no,
                    format!("unknown header field {other:?}"),
                ))
            }
        }
    }

    let missing = |name: &str| BpeError::corrupt(path, line_no, format!("missing {name}= field"));
    let header = Header {
        base: base.ok_or_else(|| missing("base"))?,
        vocab: vocab.ok_or_else(|| missing("vocab"))?,
        merges: merges.ok_or_else(|| missing("merges"))?,
        split,
    };

    if header.base.checked_add(header.merges) != Some(header.vocab) {
        return Err(BpeError::corrupt(
            path,
            line_no,
            format!(
                "vocab={} does not equal base={} + merges={}",
                header.vocab, header.base, header.merges
            ),
        ));
    }
    if header.vocab > u32::MAX as usize {
        return Err(BpeError::corrupt(path, line_no, "vocab exceeds the id range"));
    }
    Ok(header)
}

fn parse_base<'a>(
    tokens: impl Iterator<Item = &'a str>,
    expected: usize,
    path: &Path,
    line_no: usize,
) -> Result<Vec<u8>> {
    let base = tokens
        .map(|t| {
            t.parse::<u8>().map_err(|_| {
                BpeError::corrupt(path, line_no, format!("invalid base byte {t:?}"))
            })
        })
        .collect::<Result<Vec<u8>>>()?;
    if base.len() != expected {
        return Err(BpeError::corrupt(
            path,
            line_no,
            format!("expected {expected} base bytes, found {}", base.len()),
        ));
    }
    distinct_base(base, path, line_no)
}

fn distinct_base(base: Vec<u8>, path: &Path, line_no: usize) -> Result<Vec<u8>> {
    let mut seen = AHashSet::with_capacity(base.len());
    for &byte in &base {
        if !seen.insert(byte) {
            return Err(BpeError::corrupt(
                path,
                line_no,
                format!("duplicate base byte {byte}"),
            ));
        }
    }
    Ok(base)
}

/// Rebuild the model, rejecting rules that reference ids not yet created.
fn build_model(
    base: Vec<u8>,
    merges: &[Pair],
    split: SplitPolicy,
    path: &Path,
    line_of: impl Fn(usize) -> usize,
) -> Result<Model> {
    let mut model = Model::new(base, split);
    for (i, &(left, right)) in merges.iter().enumerate() {
        let next_id = model.vocab_size() as u64;
        if left as u64 >= next_id || right as u64 >= next_id {
            return Err(BpeError::corrupt(
                path,
                line_of(i),
                format!("rule {i} ({left}, {right}) references an id not below {next_id}"),
            ));
        }
        model.push_merge(left, right)?;
    }
    Ok(model)
}
