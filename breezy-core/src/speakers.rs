/// Client-side copy of the server's speaker list. Only ever replaced
/// wholesale with the result of the latest successful fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeakerRegistry {
    speakers: Vec<String>,
}

impl SpeakerRegistry {
    pub fn new(speakers: Vec<String>) -> Self {
        Self { speakers }
    }

    pub fn replace(&mut self, speakers: Vec<String>) {
        self.speakers = speakers;
    }

    pub fn all(&self) -> &[String] {
        &self.speakers
    }

    pub fn contains(&self, speaker_id: &str) -> bool {
        self.speakers.iter().any(|s| s == speaker_id)
    }

    /// Case-insensitive substring match, in list order. An empty query
    /// matches everything.
    pub fn search(&self, query: &str) -> Vec<&str> {
        let query = query.to_lowercase();
        self.speakers
            .iter()
            .filter(|speaker| speaker.to_lowercase().contains(&query))
            .map(String::as_str)
            .collect()
    }
}
