use std::fmt;

/// A weighted link to a node of the network,
/// stored with the node it leaves from.
#[derive(Clone, Copy, PartialEq)]
pub struct Connection {
    pub output: usize,
    pub weight: f32,
}

impl Connection {
    pub fn new(output: usize, weight: f32) -> Connection {
        Connection { output, weight }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-> {} ({:.6})", self.output, self.weight)
    }
}
