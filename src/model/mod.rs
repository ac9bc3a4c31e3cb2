use log::warn;
use std::fmt;
use tokio::sync::OnceCell;

pub const UNKNOWN_RELEASE_YEAR: &str = "Unknown";

#[derive(Clone, Debug)]
pub struct TrackRecord {
    pub id: String,
    pub name: String,
    pub artist_name: String,
    pub album_name: String,
    pub release_year: String,
    pub duration: String,
    pub image_url: Option<String>,
    image: OnceCell<Vec<u8>>,
}

impl TrackRecord {
    pub fn new(
        id: String,
        name: String,
        artist_name: String,
        album_name: String,
        release_year: String,
        duration: String,
        image_url: Option<String>,
    ) -> Self {
        Self {
            id,
            name,
            artist_name,
            album_name,
            release_year,
            duration,
            image_url,
            image: OnceCell::new(),
        }
    }

    /// The cover image bytes, if [`TrackRecord::load_image`] has already succeeded.
    pub fn image(&self) -> Option<&[u8]> {
        self.image.get().map(Vec::as_slice)
    }

    /// Downloads the cover image on the first successful call and keeps it afterwards.
    pub async fn load_image(&self, http_client: &reqwest::Client) -> Option<&[u8]> {
        let url = self.image_url.as_deref()?;

        match self
            .image
            .get_or_try_init(|| Self::download_image(http_client, url))
            .await
        {
            Ok(image) => Some(image.as_slice()),
            Err(error) => {
                warn!("Could not load the image of the track {}: {error}", self.name);
                None
            }
        }
    }

    async fn download_image(http_client: &reqwest::Client, url: &str) -> reqwest::Result<Vec<u8>> {
        let response = http_client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

impl fmt::Display for TrackRecord {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{}({}) by {} - {}({})",
            self.name, self.duration, self.artist_name, self.album_name, self.release_year
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtistCandidate {
    pub id: String,
    pub name: String,
    pub popularity: u32,
}

impl ArtistCandidate {
    pub fn new(id: impl Into<String>, name: impl Into<String>, popularity: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            popularity,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlbumSummary {
    pub id: String,
    pub name: String,
    pub release_year: String,
    pub cover_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlbumTrack {
    pub id: String,
    pub name: String,
    pub duration: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Album {
    pub summary: AlbumSummary,
    pub tracks: Vec<AlbumTrack>,
}

/// Formats a duration as `M:SS`, truncating partial seconds.
pub fn format_duration(milliseconds: u64) -> String {
    let seconds = milliseconds / 1000;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub fn release_year(release_date: Option<&str>) -> String {
    match release_date.map(str::trim) {
        None | Some("") => UNKNOWN_RELEASE_YEAR.to_owned(),
        Some(release_date) => release_date.chars().take(4).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track() -> TrackRecord {
        TrackRecord::new(
            "4u7EnebtmKWzUH433cf5Qv".to_owned(),
            "Bohemian Rhapsody".to_owned(),
            "Queen".to_owned(),
            "A Night at the Opera".to_owned(),
            "1975".to_owned(),
            "5:55".to_owned(),
            None,
        )
    }

    #[test]
    fn formats_durations() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(999), "0:00");
        assert_eq!(format_duration(61_000), "1:01");
        assert_eq!(format_duration(599_999), "9:59");
        assert_eq!(format_duration(600_000), "10:00");
    }

    #[test]
    fn extracts_release_years() {
        assert_eq!(release_year(Some("1999-03-02")), "1999");
        assert_eq!(release_year(Some("2004")), "2004");
        assert_eq!(release_year(Some("")), UNKNOWN_RELEASE_YEAR);
        assert_eq!(release_year(None), UNKNOWN_RELEASE_YEAR);
    }

    #[test]
    fn displays_a_track() {
        assert_eq!(
            track().to_string(),
            "Bohemian Rhapsody(5:55) by Queen - A Night at the Opera(1975)"
        );
    }

    #[tokio::test]
    async fn a_track_without_an_image_url_loads_no_image() {
        let track = track();

        assert_eq!(track.load_image(&reqwest::Client::new()).await, None);
        assert_eq!(track.image(), None);
    }
}
