//! Playback length of synthesized audio.

use std::io::Cursor;

use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::TimeBase;

/// Duration of an MP3 in seconds, `None` if the bytes are not parseable.
///
/// Uses the frame count from the stream header when present, otherwise
/// sums packet durations without decoding.
pub fn audio_duration_secs(data: &[u8]) -> Option<f64> {
    let cursor = Cursor::new(data.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let mut hint = Hint::new();
    let _ = hint.with_extension("mp3");

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .ok()?;
    let mut format = probed.format;

    let track = format.default_track()?;
    let track_id = track.id;
    let sample_rate = track.codec_params.sample_rate?;
    let time_base = track
        .codec_params
        .time_base
        .unwrap_or_else(|| TimeBase::new(1, sample_rate));
    let n_frames = track.codec_params.n_frames;

    let frames = match n_frames {
        Some(n) => n,
        None => {
            let mut total = 0u64;
            while let Ok(packet) = format.next_packet() {
                if packet.track_id() == track_id {
                    total += packet.dur;
                }
            }
            total
        }
    };

    if frames == 0 {
        return None;
    }

    let time = time_base.calc_time(frames);
    Some(time.seconds as f64 + time.frac)
}
