//! Multi-document stream splitting

/// One document of a YAML stream, before decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    /// 1-based position within the stream
    pub index: usize,
    pub text: String,
}

impl RawDocument {
    /// True when the document holds nothing but whitespace and comments,
    /// e.g. a Helm template that rendered to an empty `# Source:` block
    pub fn is_blank(&self) -> bool {
        self.text.lines().all(|line| {
            let line = line.trim();
            line.is_empty() || line.starts_with('#')
        })
    }
}

/// True for a document marker: `---` at column 0, followed by nothing,
/// whitespace or a comment
fn is_separator(line: &str) -> bool {
    let Some(rest) = line.strip_prefix("---") else {
        return false;
    };
    let trimmed = rest.trim_start();
    trimmed.is_empty() || (trimmed.starts_with('#') && trimmed.len() < rest.len())
}

/// Split on `---` document markers
///
/// Indented `---` lines belong to block scalars and are kept as content.
///
/// Every chunk is returned, including blank ones, so that document indices
/// line up with what a reader counts in the file.
pub fn split_documents(content: &str) -> Vec<RawDocument> {
    let mut documents = Vec::new();
    let mut current = String::new();

    for line in content.lines() {
        if is_separator(line) {
            documents.push(std::mem::take(&mut current));
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }

    if !current.is_empty() {
        documents.push(current);
    }

    documents
        .into_iter()
        .enumerate()
        .map(|(i, text)| RawDocument { index: i + 1, text })
        .collect()
}
