use bitflags::bitflags;
use phf::phf_map;

bitflags! {
    /// Flags controlling when a keyword matches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct KeywordFlags: u8 {
        /// Only match inside brackets. Short/common words ("BD", "TV", "SP")
        /// would otherwise eat parts of titles.
        const AMBIGUOUS = 0b0000_0001;
    }
}

/// The category a keyword belongs to, determining which element it populates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordKind {
    VideoCodec,
    AudioCodec,
    Resolution,
    Source,
    VideoTerm,
    AudioTerm,
    Language,
    Subtitles,
    ReleaseInfo,
    AnimeType,
    StreamingSource,
    FileExtension,
}

/// A keyword entry with its kind and matching flags.
#[derive(Debug, Clone, Copy)]
pub struct KeywordEntry {
    pub kind: KeywordKind,
    pub flags: KeywordFlags,
}

impl KeywordEntry {
    const fn new(kind: KeywordKind) -> Self {
        Self {
            kind,
            flags: KeywordFlags::empty(),
        }
    }

    const fn ambiguous(kind: KeywordKind) -> Self {
        Self {
            kind,
            flags: KeywordFlags::AMBIGUOUS,
        }
    }
}

/// Compile-time keyword lookup table.
/// All keys are UPPERCASE for case-insensitive matching.
pub static KEYWORDS: phf::Map<&'static str, KeywordEntry> = phf_map! {
    // ── Video codecs ─────────────────────────────────────────────
    "H264" => KeywordEntry::new(KeywordKind::VideoCodec),
    "H.264" => KeywordEntry::new(KeywordKind::VideoCodec),
    "X264" => KeywordEntry::new(KeywordKind::VideoCodec),
    "H265" => KeywordEntry::new(KeywordKind::VideoCodec),
    "H.265" => KeywordEntry::new(KeywordKind::VideoCodec),
    "X265" => KeywordEntry::new(KeywordKind::VideoCodec),
    "HEVC" => KeywordEntry::new(KeywordKind::VideoCodec),
    "AVC" => KeywordEntry::new(KeywordKind::VideoCodec),
    "AV1" => KeywordEntry::new(KeywordKind::VideoCodec),
    "XVID" => KeywordEntry::new(KeywordKind::VideoCodec),
    "VP9" => KeywordEntry::new(KeywordKind::VideoCodec),
    "10BIT" => KeywordEntry::new(KeywordKind::VideoCodec),
    "10-BIT" => KeywordEntry::new(KeywordKind::VideoCodec),
    "HI10P" => KeywordEntry::new(KeywordKind::VideoCodec),

    // ── Audio codecs ─────────────────────────────────────────────
    "AAC" => KeywordEntry::new(KeywordKind::AudioCodec),
    "AAC2.0" => KeywordEntry::new(KeywordKind::AudioCodec),
    "AC3" => KeywordEntry::new(KeywordKind::AudioCodec),
    "EAC3" => KeywordEntry::new(KeywordKind::AudioCodec),
    "DDP" => KeywordEntry::new(KeywordKind::AudioCodec),
    "DDP2.0" => KeywordEntry::new(KeywordKind::AudioCodec),
    "FLAC" => KeywordEntry::new(KeywordKind::AudioCodec),
    "MP3" => KeywordEntry::new(KeywordKind::AudioCodec),
    "OPUS" => KeywordEntry::new(KeywordKind::AudioCodec),
    "DTS" => KeywordEntry::new(KeywordKind::AudioCodec),
    "TRUEHD" => KeywordEntry::new(KeywordKind::AudioCodec),

    // ── Audio terms ──────────────────────────────────────────────
    "2.0CH" => KeywordEntry::new(KeywordKind::AudioTerm),
    "5.1CH" => KeywordEntry::new(KeywordKind::AudioTerm),
    "DUAL AUDIO" => KeywordEntry::new(KeywordKind::AudioTerm),
    "DUAL-AUDIO" => KeywordEntry::new(KeywordKind::AudioTerm),
    "DUALAUDIO" => KeywordEntry::new(KeywordKind::AudioTerm),

    // ── Resolution ───────────────────────────────────────────────
    "480P" => KeywordEntry::new(KeywordKind::Resolution),
    "720P" => KeywordEntry::new(KeywordKind::Resolution),
    "1080P" => KeywordEntry::new(KeywordKind::Resolution),
    "1080I" => KeywordEntry::new(KeywordKind::Resolution),
    "2160P" => KeywordEntry::new(KeywordKind::Resolution),
    "4K" => KeywordEntry::new(KeywordKind::Resolution),
    "SD" => KeywordEntry::ambiguous(KeywordKind::Resolution),
    "HD" => KeywordEntry::ambiguous(KeywordKind::Resolution),

    // ── Source ───────────────────────────────────────────────────
    "BD" => KeywordEntry::ambiguous(KeywordKind::Source),
    "BDRIP" => KeywordEntry::new(KeywordKind::Source),
    "BDREMUX" => KeywordEntry::new(KeywordKind::Source),
    "BLURAY" => KeywordEntry::new(KeywordKind::Source),
    "BLU-RAY" => KeywordEntry::new(KeywordKind::Source),
    "DVD" => KeywordEntry::ambiguous(KeywordKind::Source),
    "DVDRIP" => KeywordEntry::new(KeywordKind::Source),
    "HDTV" => KeywordEntry::new(KeywordKind::Source),
    "TVRIP" => KeywordEntry::new(KeywordKind::Source),
    "WEB" => KeywordEntry::ambiguous(KeywordKind::Source),
    "WEBDL" => KeywordEntry::new(KeywordKind::Source),
    "WEB-DL" => KeywordEntry::new(KeywordKind::Source),
    "WEBRIP" => KeywordEntry::new(KeywordKind::Source),
    "WEB-RIP" => KeywordEntry::new(KeywordKind::Source),
    "BATCH" => KeywordEntry::ambiguous(KeywordKind::Source),

    // ── Video terms ──────────────────────────────────────────────
    "HDR" => KeywordEntry::new(KeywordKind::VideoTerm),
    "HDR10" => KeywordEntry::new(KeywordKind::VideoTerm),
    "DV" => KeywordEntry::ambiguous(KeywordKind::VideoTerm),
    "60FPS" => KeywordEntry::new(KeywordKind::VideoTerm),

    // ── Release info ─────────────────────────────────────────────
    "REMASTERED" => KeywordEntry::new(KeywordKind::ReleaseInfo),
    "UNCENSORED" => KeywordEntry::new(KeywordKind::ReleaseInfo),
    "UNCUT" => KeywordEntry::new(KeywordKind::ReleaseInfo),
    "END" => KeywordEntry::ambiguous(KeywordKind::ReleaseInfo),
    "FINAL" => KeywordEntry::ambiguous(KeywordKind::ReleaseInfo),
    "REPACK" => KeywordEntry::new(KeywordKind::ReleaseInfo),

    // ── Anime type ───────────────────────────────────────────────
    "MOVIE" => KeywordEntry::new(KeywordKind::AnimeType),
    "GEKIJOUBAN" => KeywordEntry::new(KeywordKind::AnimeType),
    "OVA" => KeywordEntry::new(KeywordKind::AnimeType),
    "OAV" => KeywordEntry::new(KeywordKind::AnimeType),
    "OAD" => KeywordEntry::new(KeywordKind::AnimeType),
    "ONA" => KeywordEntry::new(KeywordKind::AnimeType),
    "SPECIAL" => KeywordEntry::ambiguous(KeywordKind::AnimeType),
    "SPECIALS" => KeywordEntry::new(KeywordKind::AnimeType),
    "SP" => KeywordEntry::ambiguous(KeywordKind::AnimeType),
    "TV" => KeywordEntry::ambiguous(KeywordKind::AnimeType),

    // ── Subtitles / language ─────────────────────────────────────
    "MULTI-SUB" => KeywordEntry::new(KeywordKind::Subtitles),
    "MULTI-SUBS" => KeywordEntry::new(KeywordKind::Subtitles),
    "MULTISUB" => KeywordEntry::new(KeywordKind::Subtitles),
    "SUBBED" => KeywordEntry::new(KeywordKind::Subtitles),
    "DUBBED" => KeywordEntry::new(KeywordKind::Subtitles),
    "ESUB" => KeywordEntry::new(KeywordKind::Subtitles),
    "ENG" => KeywordEntry::ambiguous(KeywordKind::Language),
    "ENGLISH" => KeywordEntry::ambiguous(KeywordKind::Language),
    "JPN" => KeywordEntry::ambiguous(KeywordKind::Language),
    "JAP" => KeywordEntry::ambiguous(KeywordKind::Language),

    // ── Streaming sources ────────────────────────────────────────
    "CR" => KeywordEntry::ambiguous(KeywordKind::StreamingSource),
    "AMZN" => KeywordEntry::new(KeywordKind::StreamingSource),
    "NF" => KeywordEntry::ambiguous(KeywordKind::StreamingSource),
    "DSNP" => KeywordEntry::new(KeywordKind::StreamingSource),
    "HIDI" => KeywordEntry::new(KeywordKind::StreamingSource),
    "ADN" => KeywordEntry::ambiguous(KeywordKind::StreamingSource),

    // ── File extensions left inside names ────────────────────────
    "MKV" => KeywordEntry::ambiguous(KeywordKind::FileExtension),
    "MP4" => KeywordEntry::ambiguous(KeywordKind::FileExtension),
};

/// Look up a keyword (case-insensitive).
///
/// Ambiguous keywords only match when `enclosed` is true.
pub fn lookup(s: &str, enclosed: bool) -> Option<KeywordKind> {
    let entry = KEYWORDS.get(s.to_uppercase().as_str())?;
    if entry.flags.contains(KeywordFlags::AMBIGUOUS) && !enclosed {
        return None;
    }
    Some(entry.kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_case_insensitive() {
        assert_eq!(lookup("hevc", false), Some(KeywordKind::VideoCodec));
        assert_eq!(lookup("1080P", false), Some(KeywordKind::Resolution));
    }

    #[test]
    fn test_ambiguous_only_in_brackets() {
        assert_eq!(lookup("BD", false), None);
        assert_eq!(lookup("BD", true), Some(KeywordKind::Source));
        assert_eq!(lookup("TV", false), None);
    }

    #[test]
    fn test_unknown_word() {
        assert_eq!(lookup("Frieren", true), None);
    }
}
