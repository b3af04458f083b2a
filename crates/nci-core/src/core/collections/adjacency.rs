/// Compressed sparse row (CSR) list of the edges incident to each node.
///
/// Built from two parallel endpoint arrays; each edge appears in the lists of
/// both of its endpoints, and every list holds edge indices in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjacencyList {
    /// `offsets[n]..offsets[n + 1]` is the slice of `edges` belonging to node `n`.
    offsets: Vec<usize>,
    edges: Vec<usize>,
}

impl AdjacencyList {
    /// Builds the adjacency of `node_count` nodes from the first `edge_count`
    /// entries of the endpoint arrays.
    ///
    /// # Arguments
    ///
    /// * `index1` - First endpoint of each edge.
    /// * `index2` - Second endpoint of each edge.
    /// * `edge_count` - Number of edges to take from the endpoint arrays.
    /// * `node_count` - Number of nodes; every endpoint must be below it.
    pub fn new(index1: &[usize], index2: &[usize], edge_count: usize, node_count: usize) -> Self {
        debug_assert!(index1.len() >= edge_count && index2.len() >= edge_count);

        let mut offsets = vec![0usize; node_count + 1];
        for edge in 0..edge_count {
            offsets[index1[edge] + 1] += 1;
            offsets[index2[edge] + 1] += 1;
        }
        for node in 0..node_count {
            offsets[node + 1] += offsets[node];
        }

        let mut fill = offsets.clone();
        let mut edges = vec![0usize; offsets[node_count]];
        for edge in 0..edge_count {
            for node in [index1[edge], index2[edge]] {
                edges[fill[node]] = edge;
                fill[node] += 1;
            }
        }

        Self { offsets, edges }
    }

    pub fn node_count(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Indices of the edges incident to `node`, ascending.
    pub fn edges_of(&self, node: usize) -> &[usize] {
        &self.edges[self.offsets[node]..self.offsets[node + 1]]
    }

    pub fn degree(&self, node: usize) -> usize {
        self.offsets[node + 1] - self.offsets[node]
    }

    /// Start offset of every node's edge block, plus the total as the last entry.
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Concatenated edge blocks.
    pub fn edge_indices(&self) -> &[usize] {
        &self.edges
    }
}
