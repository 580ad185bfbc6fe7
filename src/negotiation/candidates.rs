use std::collections::HashSet;
use std::fmt;

/// Namespaces tried for every stream id
pub const DEFAULT_NAMESPACES: [&str; 3] = ["live", "rtp", "proxy"];

/// Identity of the desired stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StreamTarget {
    /// Server-side application name (`app=`)
    pub namespace: String,

    /// Stream name (`stream=`)
    pub stream_id: String,
}

impl StreamTarget {
    pub fn new(namespace: impl Into<String>, stream_id: impl Into<String>) -> Self {
        StreamTarget {
            namespace: namespace.into(),
            stream_id: stream_id.into(),
        }
    }

    /// Check if a stream id was given
    pub fn is_specified(&self) -> bool {
        !self.stream_id.trim().is_empty()
    }
}

impl fmt::Display for StreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.stream_id)
    }
}

/// Build the ordered, deduplicated candidate sequence for a target.
///
/// Order: the literal pair, the id under every namespace, the id with
/// spaces as underscores under every namespace, the lower-cased underscored
/// id under every namespace, then the id with spaces removed under the
/// primary (first) namespace.
pub fn build_candidates(target: &StreamTarget, namespaces: &[String]) -> Vec<StreamTarget> {
    let underscored = target.stream_id.replace(' ', "_");
    let lowered = underscored.to_lowercase();
    let compact = target.stream_id.replace(' ', "");

    let mut ordered = vec![target.clone()];
    for id in [&target.stream_id, &underscored, &lowered] {
        for namespace in namespaces {
            ordered.push(StreamTarget::new(namespace.as_str(), id.as_str()));
        }
    }
    if let Some(primary) = namespaces.first() {
        ordered.push(StreamTarget::new(primary.as_str(), compact));
    }

    let mut seen = HashSet::new();
    ordered.retain(|candidate| seen.insert(candidate.clone()));
    ordered
}

/// Candidates for one target plus the index of the one being tried
#[derive(Debug, Clone)]
pub struct CandidateList {
    target: StreamTarget,
    candidates: Vec<StreamTarget>,
    index: usize,
}

impl CandidateList {
    pub fn new(target: StreamTarget, namespaces: &[String]) -> Self {
        let candidates = build_candidates(&target, namespaces);
        CandidateList {
            target,
            candidates,
            index: 0,
        }
    }

    /// Target the list was built from
    pub fn target(&self) -> &StreamTarget {
        &self.target
    }

    /// Candidate currently being tried, `None` once exhausted
    pub fn current(&self) -> Option<&StreamTarget> {
        self.candidates.get(self.index)
    }

    /// Move to the next candidate
    pub fn advance(&mut self) -> Option<&StreamTarget> {
        if self.index < self.candidates.len() {
            self.index += 1;
        }
        self.current()
    }

    /// Zero-based index of the current candidate
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of candidates
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Check if every candidate has been tried
    pub fn is_exhausted(&self) -> bool {
        self.index >= self.candidates.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StreamTarget> {
        self.candidates.iter()
    }
}
