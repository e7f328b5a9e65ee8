//! Time-of-flight estimation
//!
//! Matched-filter style echo picking. Every pair of peaks votes for the time
//! difference between them, weighted by the smaller of the two amplitudes.
//! The strongest peak of each ramp of consecutive peaks votes a second time
//! into a separate accumulator. Both are smoothed and the best bucket is the
//! round trip time to the liquid surface.
//!
//! All float operations happen in the same order as in the sensor vendor's
//! app, so results are reproducible bit for bit.

use crate::payload::{
    MAX_PEAKS,
    Peak,
    Peaks,
};

/// Default reference voltage, sets the amplitude noise floor.
pub const DEFAULT_VREF: f64 = 1.2421875;

/// Number of buckets on the discretized time axis.
pub const NUM_BUCKETS: usize = 100;

/// Buckets below this are too close to the sensor to be an echo.
const FIRST_CANDIDATE_BUCKET: usize = 2;

/// A bucket needs a score above this to be picked.
const SCORE_THRESHOLD: f64 = 0.005;

/// If no peak is stronger than this, the signal is noise.
const MIN_AMPLITUDE: f64 = 0.63453125;

/// Time of flight per bucket.
const SECONDS_PER_BUCKET: f64 = 2e-5;

const RAMP_TOLERANCE: f64 = 1e-6;

/// Estimates the time of flight from the peaks of a frame.
///
/// Returns 0 if there is no echo.
pub fn estimate_time_of_flight(peaks: &Peaks, vref: f64) -> f64 {
    if peaks.is_empty() {
        return 0.0;
    }

    let samples = Samples::new(peaks, vref);
    let ramps = representatives(peaks);

    let all = accumulate_all(&samples);
    let strongest = accumulate_representatives(&samples, &ramps);
    let scores = smooth(&all, &strongest);
    let bucket = best_bucket(&scores);

    let max_amplitude = peaks
        .iter()
        .map(|peak| peak.amplitude)
        .max()
        .unwrap_or_default();

    tracing::trace!(bucket, max_amplitude, "time of flight");

    if f64::from(max_amplitude) <= MIN_AMPLITUDE {
        0.0
    }
    else {
        SECONDS_PER_BUCKET * bucket as f64
    }
}

/// Discounts amplitudes for late echoes, and floors everything below half of
/// `vref` to 0.
pub fn adjust_amplitude(amplitude: f64, time: f64, vref: f64) -> f64 {
    let half = 0.5 * vref;
    let discount = (255.0 - time) / 256.0;
    if amplitude <= half {
        0.0
    }
    else {
        (amplitude - half) * discount
    }
}

/// Peak time on the bucket axis, and its adjusted amplitude.
#[derive(Clone, Copy, Debug, Default)]
struct Sample {
    time: f64,
    weight: f64,
}

#[derive(Debug)]
struct Samples {
    items: [Sample; MAX_PEAKS],
    len: usize,
}

impl Samples {
    fn new(peaks: &Peaks, vref: f64) -> Self {
        let mut items = [Sample::default(); MAX_PEAKS];
        for (sample, peak) in items.iter_mut().zip(peaks.iter()) {
            let time = bucket_time(peak);
            *sample = Sample {
                time,
                weight: adjust_amplitude(f64::from(peak.amplitude), time, vref),
            };
        }
        Self {
            items,
            len: peaks.len(),
        }
    }

    fn as_slice(&self) -> &[Sample] {
        &self.items[..self.len]
    }
}

fn bucket_time(peak: &Peak) -> f64 {
    f64::from(peak.time_offset) / 2.0
}

/// Index of the strongest peak of each ramp.
///
/// A ramp is a run of peaks that are exactly one bucket apart. On ties the
/// first peak wins.
fn representatives(peaks: &[Peak]) -> ([usize; MAX_PEAKS], usize) {
    let mut indices = [0; MAX_PEAKS];
    let mut count = 0;
    let mut ramp_start = 0;

    for end in 1..=peaks.len() {
        let ramp_continues = end < peaks.len()
            && ((bucket_time(&peaks[end - 1]) + 1.0) - bucket_time(&peaks[end])).abs()
                <= RAMP_TOLERANCE;
        if ramp_continues {
            continue;
        }

        let mut strongest = ramp_start;
        for index in ramp_start + 1..end {
            if peaks[index].amplitude > peaks[strongest].amplitude {
                strongest = index;
            }
        }
        indices[count] = strongest;
        count += 1;
        ramp_start = end;
    }

    (indices, count)
}

type Buckets = [f64; NUM_BUCKETS];

/// Adds `value` to the bucket nearest to `time`. Times off the axis are
/// dropped.
fn vote(buckets: &mut Buckets, time: f64, value: f64) {
    // ties round to even, like the vendor app
    let bucket = time.round_ties_even();
    if (0.0..NUM_BUCKETS as f64).contains(&bucket) {
        buckets[bucket as usize] += value;
    }
}

fn accumulate_all(samples: &Samples) -> Buckets {
    let mut buckets = [0.0; NUM_BUCKETS];
    let samples = samples.as_slice();

    for (i, back) in samples.iter().enumerate() {
        vote(&mut buckets, back.time, 0.5 * back.weight);
        for front in &samples[i + 1..] {
            vote(
                &mut buckets,
                front.time - back.time,
                front.weight.min(back.weight),
            );
        }
    }

    buckets
}

fn accumulate_representatives(
    samples: &Samples,
    (indices, count): &([usize; MAX_PEAKS], usize),
) -> Buckets {
    let mut buckets = [0.0; NUM_BUCKETS];
    let samples = samples.as_slice();
    let indices = &indices[..*count];

    for (i, back) in indices.iter().map(|index| &samples[*index]).enumerate() {
        vote(&mut buckets, back.time, back.weight);
        for front in indices[i + 1..].iter().map(|index| &samples[*index]) {
            vote(
                &mut buckets,
                front.time - back.time,
                (front.weight + back.weight) / 2.0,
            );
        }
    }

    buckets
}

fn smooth(all: &Buckets, strongest: &Buckets) -> Buckets {
    let (n, m) = (all, strongest);
    let last = NUM_BUCKETS - 1;
    let mut scores = [0.0; NUM_BUCKETS];

    scores[0] = 0.25 * n[1] + 0.5 * n[0] + 0.5 * m[1] + 0.5 * m[0];
    for b in 1..last {
        scores[b] = 0.25 * (n[b - 1] + n[b + 1])
            + 0.5 * n[b]
            + 0.5 * (m[b - 1] + m[b + 1])
            + 0.5 * m[b];
    }
    scores[last] = 0.25 * n[last - 1] + 0.5 * n[last] + 0.5 * m[last - 1] + 0.5 * m[last];

    scores
}

/// Lowest bucket with the highest score, or 0 if no bucket is above the
/// threshold.
fn best_bucket(scores: &Buckets) -> usize {
    let mut best = 0;
    let mut max_score = SCORE_THRESHOLD;

    for (bucket, score) in scores.iter().enumerate().skip(FIRST_CANDIDATE_BUCKET) {
        if *score > max_score {
            max_score = *score;
            best = bucket;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use crate::{
        payload::{
            Peak,
            Peaks,
            SensorFrame,
        },
        tof::{
            DEFAULT_VREF,
            NUM_BUCKETS,
            Samples,
            accumulate_all,
            adjust_amplitude,
            best_bucket,
            estimate_time_of_flight,
            representatives,
            smooth,
            vote,
        },
    };

    fn peaks(peaks: &[(u8, u16)]) -> Peaks {
        let mut list = Peaks::new();
        for (amplitude, time_offset) in peaks {
            list.push(Peak::new(*amplitude, *time_offset)).unwrap();
        }
        list
    }

    fn tof_of(hex: &str) -> f64 {
        let frame = SensorFrame::from_hex(hex).unwrap();
        estimate_time_of_flight(&frame.peaks, DEFAULT_VREF)
    }

    #[test]
    fn it_estimates_the_golden_payload() {
        // regression fixture
        let tof = tof_of("1AFF0D000002B765924F310302157CA080030D74E08107EA287B270302A0AD");
        assert_abs_diff_eq!(tof, 0.00126, epsilon = 1e-12);
    }

    #[test]
    fn it_estimates_an_xl_payload() {
        let tof = tof_of("1AFF0D000003B765924F310302157CA080030D74E08107EA287B270302A0AD");
        assert_abs_diff_eq!(tof, 0.00038, epsilon = 1e-12);
    }

    #[test]
    fn it_estimates_a_short_ramp() {
        let tof = estimate_time_of_flight(&peaks(&[(3, 1), (3, 2)]), DEFAULT_VREF);
        assert_abs_diff_eq!(tof, 4e-5, epsilon = 1e-12);
    }

    #[test]
    fn it_returns_zero_without_peaks() {
        assert_eq!(estimate_time_of_flight(&Peaks::new(), DEFAULT_VREF), 0.0);
    }

    #[test]
    fn it_returns_zero_for_noise() {
        let tof = estimate_time_of_flight(&peaks(&[(0, 5), (0, 40)]), DEFAULT_VREF);
        assert_eq!(tof, 0.0);
    }

    #[test]
    fn it_is_deterministic() {
        let peaks = peaks(&[(146, 79), (49, 3), (124, 160), (224, 129), (40, 123)]);
        let first = estimate_time_of_flight(&peaks, DEFAULT_VREF);
        let second = estimate_time_of_flight(&peaks, DEFAULT_VREF);
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn it_adjusts_amplitudes() {
        assert_eq!(adjust_amplitude(0.5, 10.0, DEFAULT_VREF), 0.0);
        assert_eq!(adjust_amplitude(0.62109375, 10.0, DEFAULT_VREF), 0.0);
        assert_abs_diff_eq!(
            adjust_amplitude(10.62109375, 127.0, DEFAULT_VREF),
            5.0,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            adjust_amplitude(100.62109375, 255.0, DEFAULT_VREF),
            0.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn it_drops_votes_off_the_axis() {
        let mut buckets = [0.0; NUM_BUCKETS];
        vote(&mut buckets, -0.6, 1.0);
        vote(&mut buckets, -38.0, 1.0);
        vote(&mut buckets, 99.5, 1.0);
        assert!(buckets.iter().all(|value| *value == 0.0));

        vote(&mut buckets, -0.4, 1.0);
        vote(&mut buckets, 98.5, 1.0);
        vote(&mut buckets, 2.5, 1.0);
        assert_eq!(buckets[0], 1.0);
        assert_eq!(buckets[98], 1.0);
        assert_eq!(buckets[2], 1.0);
    }

    #[test]
    fn it_drops_negative_time_differences() {
        // the second peak comes before the first one
        let peaks = peaks(&[(146, 79), (49, 3)]);
        let samples = Samples::new(&peaks, DEFAULT_VREF);
        let [back, front] = samples.as_slice()
        else {
            panic!("expected 2 samples");
        };

        let buckets = accumulate_all(&samples);

        // only the self votes at 39.5 and 1.5 remain
        assert_eq!(buckets[40], 0.5 * back.weight);
        assert_eq!(buckets[2], 0.5 * front.weight);
        let total = buckets.iter().sum::<f64>();
        assert_abs_diff_eq!(total, 0.5 * (back.weight + front.weight), epsilon = 1e-12);
    }

    #[test]
    fn it_finds_ramp_representatives() {
        // ramps: [0, 1, 2], [3], [4, 5]
        let peaks = [
            Peak::new(5, 10),
            Peak::new(9, 12),
            Peak::new(9, 14),
            Peak::new(1, 40),
            Peak::new(2, 80),
            Peak::new(7, 82),
        ];
        let (indices, count) = representatives(&peaks);
        assert_eq!(&indices[..count], &[1, 3, 5]);
    }

    #[test]
    fn it_picks_the_first_peak_of_a_silent_ramp() {
        let peaks = [Peak::new(9, 10), Peak::new(0, 40), Peak::new(0, 42)];
        let (indices, count) = representatives(&peaks);
        assert_eq!(&indices[..count], &[0, 1]);
    }

    #[test]
    fn it_smooths_without_wraparound() {
        let mut all = [0.0; NUM_BUCKETS];
        let strongest = [0.0; NUM_BUCKETS];
        all[0] = 4.0;

        let scores = smooth(&all, &strongest);
        assert_eq!(scores[0], 2.0);
        assert_eq!(scores[1], 1.0);
        assert_eq!(scores[NUM_BUCKETS - 1], 0.0);
    }

    #[test]
    fn it_ignores_the_first_buckets() {
        let mut scores = [0.0; NUM_BUCKETS];
        scores[1] = 10.0;
        assert_eq!(best_bucket(&scores), 0);

        scores[7] = 1.0;
        scores[9] = 1.0;
        assert_eq!(best_bucket(&scores), 7);

        scores[99] = 2.0;
        assert_eq!(best_bucket(&scores), 99);
    }
}
