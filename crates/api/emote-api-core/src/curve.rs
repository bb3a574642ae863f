//! Scalar keyframe curves.

use serde::{Deserialize, Serialize};

/// One key on a scalar curve. `time` is in seconds.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
}

impl Keyframe {
    pub fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// Keys ordered by strictly increasing time.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Curve {
    pub keys: Vec<Keyframe>,
}

impl Curve {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flat curve holding `value` from `0` to `duration`.
    pub fn held(value: f32, duration: f32) -> Self {
        let mut curve = Self::new();
        curve.add_key(0.0, value);
        curve.add_key(duration, value);
        curve
    }

    /// Insert a key keeping time order. Returns the key's index, or `None`
    /// when a key already exists at exactly `time` (the curve is unchanged).
    pub fn add_key(&mut self, time: f32, value: f32) -> Option<usize> {
        match self.keys.binary_search_by(|k| k.time.total_cmp(&time)) {
            Ok(_) => None,
            Err(idx) => {
                self.keys.insert(idx, Keyframe::new(time, value));
                Some(idx)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Sample the curve at `time`: linear between keys, clamped to the end
    /// keys outside the keyed range. `None` for an empty curve.
    pub fn evaluate(&self, time: f32) -> Option<f32> {
        let first = self.keys.first()?;
        let last = self.keys.last()?;
        if time <= first.time {
            return Some(first.value);
        }
        if time >= last.time {
            return Some(last.value);
        }
        for pair in self.keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if time >= a.time && time <= b.time {
                let span = (b.time - a.time).max(f32::EPSILON);
                let t = (time - a.time) / span;
                return Some(a.value + (b.value - a.value) * t);
            }
        }
        Some(last.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32, eps: f32) {
        assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
    }

    #[test]
    fn held_curve_has_two_equal_keys() {
        let c = Curve::held(80.0, 1.0 / 60.0);
        assert_eq!(c.len(), 2);
        assert_eq!(c.keys[0], Keyframe::new(0.0, 80.0));
        approx(c.keys[1].time, 1.0 / 60.0, 1e-7);
        assert_eq!(c.keys[1].value, 80.0);
    }

    #[test]
    fn add_key_keeps_order_and_rejects_duplicate_times() {
        let mut c = Curve::new();
        assert_eq!(c.add_key(1.0, 10.0), Some(0));
        assert_eq!(c.add_key(0.0, 0.0), Some(0));
        assert_eq!(c.add_key(0.5, 5.0), Some(1));
        assert_eq!(c.add_key(0.5, 7.0), None);
        let times: Vec<f32> = c.keys.iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 0.5, 1.0]);
        assert_eq!(c.keys[1].value, 5.0);
    }

    #[test]
    fn evaluate_interpolates_and_clamps() {
        let mut c = Curve::new();
        c.add_key(0.0, 0.0);
        c.add_key(2.0, 100.0);
        approx(c.evaluate(1.0).unwrap(), 50.0, 1e-5);
        assert_eq!(c.evaluate(-1.0), Some(0.0));
        assert_eq!(c.evaluate(5.0), Some(100.0));
        assert_eq!(Curve::new().evaluate(0.0), None);
    }
}
