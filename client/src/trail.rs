use pilot_link_shared::Position;
use std::collections::VecDeque;

/// Positions in arrival order. Unbounded unless a capacity is given, in which
/// case the oldest point is evicted first. The capacity is only a bound; the
/// buffer grows with the points actually pushed.
#[derive(Debug, Clone, Default)]
pub struct FlightTrail {
    max: Option<usize>,
    buf: VecDeque<Position>,
}

impl FlightTrail {
    pub fn new(max: Option<usize>) -> Self {
        Self {
            max,
            buf: VecDeque::new(),
        }
    }

    pub fn push(&mut self, point: Position) {
        if let Some(max) = self.max
            && self.buf.len() >= max
        {
            self.buf.pop_front();
        }
        self.buf.push_back(point);
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn as_slice(&mut self) -> &[Position] {
        self.buf.make_contiguous()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.buf.iter()
    }

    pub fn last(&self) -> Option<&Position> {
        self.buf.back()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}
