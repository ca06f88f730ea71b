use std::fmt;

/// One attributed speech interval, in absolute recording seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeechRun {
    pub start_sec: f64,
    pub end_sec: f64,
}

impl SpeechRun {
    pub fn duration(&self) -> f64 {
        self.end_sec - self.start_sec
    }
}

/// Merge speech runs separated by a gap of at most `tolerance` seconds, then
/// drop merged runs shorter than `discard_short` seconds. The input must be
/// ordered by start time; the trailing run is flushed like any other.
pub fn merge_runs(runs: &[SpeechRun], tolerance: f64, discard_short: f64) -> Vec<SpeechRun> {
    let mut out = Vec::new();
    let mut current: Option<SpeechRun> = None;
    for run in runs {
        match current.as_mut() {
            None => current = Some(*run),
            Some(cur) if run.start_sec - cur.end_sec <= tolerance => {
                cur.end_sec = cur.end_sec.max(run.end_sec);
            }
            Some(cur) => {
                if cur.duration() >= discard_short {
                    out.push(*cur);
                }
                current = Some(*run);
            }
        }
    }
    if let Some(cur) = current {
        if cur.duration() >= discard_short {
            out.push(cur);
        }
    }
    out
}

/// A row of the diarization file. The textual schema is fixed; the
/// downstream diarization and transcription stages parse it literally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiarizationEntry {
    pub channel_id: u32,
    pub start_cs: u64,
    pub dur_cs: u64,
}

impl DiarizationEntry {
    pub fn from_run(channel_id: u32, run: &SpeechRun) -> Self {
        Self {
            channel_id,
            start_cs: (run.start_sec * 100.0) as u64,
            dur_cs: (run.duration() * 100.0) as u64,
        }
    }

    /// Parse one row previously produced by `Display`. The format is
    /// lossless for the fields it encodes.
    pub fn parse_row(row: &str) -> Option<Self> {
        let tokens: Vec<&str> = row.split_whitespace().collect();
        let [chan, one, start, dur, u1, s1, u2, s2] = tokens[..] else {
            return None;
        };
        let channel_id: u32 = chan.strip_prefix("channel")?.parse().ok()?;
        if one != "1" || u1 != "U" || s1 != "S" || u2 != "U" {
            return None;
        }
        if s2 != format!("S{}", channel_id) {
            return None;
        }
        Some(Self {
            channel_id,
            start_cs: start.parse().ok()?,
            dur_cs: dur.parse().ok()?,
        })
    }
}

impl fmt::Display for DiarizationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "channel{} 1 {} {} U S U S{}",
            self.channel_id, self.start_cs, self.dur_cs, self.channel_id
        )
    }
}
