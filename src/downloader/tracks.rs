// Audio-track enumeration from raw engine format descriptors

use std::collections::HashSet;

use super::engine::FormatDescriptor;
use super::models::AudioTrack;

/// List the selectable audio tracks for a video.
///
/// Keeps language-tagged audio-only formats, first occurrence per
/// language, and always prepends the synthetic `auto` entry. A video with
/// no language-tagged tracks yields the `auto` entry alone — this is a UI
/// convenience, not part of the download path.
pub fn enumerate(formats: &[FormatDescriptor]) -> Vec<AudioTrack> {
    let mut seen = HashSet::new();
    let mut tracks = vec![AudioTrack::auto()];

    for format in formats {
        if !format.is_audio_only() {
            continue;
        }
        let Some(lang) = format.language.as_deref() else {
            continue;
        };
        if lang.is_empty() || lang == "unknown" {
            continue;
        }
        if !seen.insert(lang.to_string()) {
            continue;
        }
        tracks.push(AudioTrack {
            id: lang.to_string(),
            language: display_language(lang),
            description: format!("{lang} audio"),
        });
    }

    tracks
}

/// Two-letter codes read best upper-cased; anything longer is title-cased.
fn display_language(lang: &str) -> String {
    if lang.chars().count() == 2 {
        lang.to_uppercase()
    } else {
        title_case(lang)
    }
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audio_format(lang: Option<&str>) -> FormatDescriptor {
        FormatDescriptor {
            format_id: "251".to_string(),
            acodec: Some("opus".to_string()),
            vcodec: Some("none".to_string()),
            language: lang.map(str::to_string),
        }
    }

    fn video_format() -> FormatDescriptor {
        FormatDescriptor {
            format_id: "137".to_string(),
            acodec: Some("none".to_string()),
            vcodec: Some("avc1.640028".to_string()),
            language: Some("en".to_string()),
        }
    }

    #[test]
    fn dedupes_by_language_keeping_first() {
        let formats = vec![
            audio_format(Some("en")),
            audio_format(Some("en")),
            audio_format(Some("fr")),
        ];
        let tracks = enumerate(&formats);
        let ids: Vec<&str> = tracks.iter().map(|t| t.id.as_str()).collect();
        let languages: Vec<&str> = tracks.iter().map(|t| t.language.as_str()).collect();
        assert_eq!(ids, vec!["auto", "en", "fr"]);
        assert_eq!(languages, vec!["Auto (Default)", "EN", "FR"]);
    }

    #[test]
    fn no_tagged_tracks_yields_only_auto() {
        let formats = vec![
            video_format(),
            audio_format(None),
            audio_format(Some("unknown")),
            audio_format(Some("")),
        ];
        let tracks = enumerate(&formats);
        assert_eq!(tracks, vec![AudioTrack::auto()]);
    }

    #[test]
    fn video_only_languages_are_ignored() {
        let tracks = enumerate(&[video_format()]);
        assert_eq!(tracks.len(), 1);
    }

    #[test]
    fn longer_codes_are_title_cased() {
        let tracks = enumerate(&[audio_format(Some("en-US"))]);
        assert_eq!(tracks[1].language, "En-Us");
        assert_eq!(tracks[1].id, "en-US");
        assert_eq!(tracks[1].description, "en-US audio");
    }
}
