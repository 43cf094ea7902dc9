use vexchat_types::TranscriptEntry;

/// Displays transcript entries as they are appended.
///
/// Implementations add one display node per call, after every earlier node,
/// and bring it into view. They never touch nodes already shown.
pub trait TranscriptRenderer {
    fn render(&mut self, entry: &TranscriptEntry);
}

/// Append-only conversation log.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `entry` and render it immediately.
    pub fn append<R>(&mut self, entry: TranscriptEntry, renderer: &mut R)
    where
        R: TranscriptRenderer + ?Sized,
    {
        renderer.render(&entry);
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
