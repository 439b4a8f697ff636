//! Rolling pose history for the plots.

use std::collections::VecDeque;

use egui_plot::PlotPoints;
use simcore::Pose;

pub struct Trace {
    pub t: VecDeque<f64>,
    pub x: VecDeque<f64>,
    pub y: VecDeque<f64>,
    pub heading_deg: VecDeque<f64>,
    capacity: usize,
    last_sample: Option<f64>,
    sample_dt: f64,
}

impl Trace {
    pub fn new(seconds: f64, sample_dt: f64) -> Self {
        let capacity = (seconds / sample_dt).ceil() as usize + 1;
        Self {
            t: VecDeque::with_capacity(capacity),
            x: VecDeque::with_capacity(capacity),
            y: VecDeque::with_capacity(capacity),
            heading_deg: VecDeque::with_capacity(capacity),
            capacity,
            last_sample: None,
            sample_dt,
        }
    }

    /// Record `pose` at sim time `t`, at most once per sample interval.
    pub fn push(&mut self, t: f64, pose: Pose) {
        if let Some(last) = self.last_sample {
            if t - last < self.sample_dt {
                return;
            }
        }
        self.last_sample = Some(t);
        self.t.push_back(t);
        self.x.push_back(pose.x);
        self.y.push_back(pose.y);
        self.heading_deg.push_back(pose.heading.to_degrees());
        self.trim();
    }

    pub fn clear(&mut self) {
        self.t.clear();
        self.x.clear();
        self.y.clear();
        self.heading_deg.clear();
        self.last_sample = None;
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    fn trim(&mut self) {
        while self.t.len() > self.capacity {
            self.t.pop_front();
            self.x.pop_front();
            self.y.pop_front();
            self.heading_deg.pop_front();
        }
    }

    pub fn line<'a>(values: &'a VecDeque<f64>, t: &'a VecDeque<f64>) -> PlotPoints<'a> {
        PlotPoints::from_iter(t.iter().copied().zip(values.iter().copied()).map(|(x, y)| [x, y]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_are_rate_limited() {
        let mut trace = Trace::new(1.0, 0.1);
        trace.push(0.0, Pose::new(1.0, 2.0, 0.0));
        trace.push(0.05, Pose::new(1.5, 2.0, 0.0));
        trace.push(0.1, Pose::new(2.0, 2.0, std::f64::consts::PI));
        assert_eq!(trace.len(), 2);
        assert_eq!(trace.x[1], 2.0);
        assert!((trace.heading_deg[1] - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_drops_oldest() {
        let mut trace = Trace::new(0.75, 0.25);
        for i in 0..10 {
            trace.push(i as f64 * 0.25, Pose::new(i as f64, 0.0, 0.0));
        }
        assert_eq!(trace.len(), 4);
        assert_eq!(trace.x.front().copied(), Some(6.0));

        trace.clear();
        assert_eq!(trace.len(), 0);
        trace.push(0.0, Pose::default());
        assert_eq!(trace.len(), 1);
    }
}
