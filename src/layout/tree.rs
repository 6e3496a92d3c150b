//! Tidy placement of variable-size boxes. Children are packed left to right
//! against the accumulated contour of their earlier siblings, and each parent
//! is centred over its first and last child.

/// Contour of a subtree: for every level below its root, the leftmost and
/// rightmost extent relative to the root's centre.
type Contour = Vec<(f32, f32)>;

/// Computes cross-axis centres for nodes given in breadth-first order.
/// `parents[i]` must point to an index smaller than `i`.
pub(super) fn pack(parents: &[Option<usize>], extents: &[f32], spacing: f32) -> Vec<f32> {
    let count = parents.len();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); count];
    for (index, parent) in parents.iter().enumerate() {
        if let Some(parent) = parent {
            children[*parent].push(index);
        }
    }

    let mut contours: Vec<Contour> = vec![Vec::new(); count];
    let mut relative = vec![0.0f32; count];

    for node in (0..count).rev() {
        let half = extents[node] / 2.0;
        let mut merged: Contour = Vec::new();
        let mut offsets: Vec<f32> = Vec::with_capacity(children[node].len());

        for &child in &children[node] {
            let contour = std::mem::take(&mut contours[child]);
            let shift = if offsets.is_empty() {
                0.0
            } else {
                separation(&merged, &contour, spacing)
            };
            offsets.push(shift);
            merge(&mut merged, &contour, shift);
        }

        let center = match (offsets.first(), offsets.last()) {
            (Some(first), Some(last)) => (first + last) / 2.0,
            _ => 0.0,
        };
        for (&child, offset) in children[node].iter().zip(&offsets) {
            relative[child] = offset - center;
        }

        let mut contour = Vec::with_capacity(merged.len() + 1);
        contour.push((-half, half));
        contour.extend(
            merged
                .into_iter()
                .map(|(left, right)| (left - center, right - center)),
        );
        contours[node] = contour;
    }

    let mut positions = vec![0.0f32; count];
    for node in 0..count {
        if let Some(parent) = parents[node] {
            positions[node] = positions[parent] + relative[node];
        }
    }
    positions
}

/// Smallest shift that keeps `right` clear of `left` on every shared level.
fn separation(left: &Contour, right: &Contour, spacing: f32) -> f32 {
    left.iter()
        .zip(right)
        .map(|((_, left_edge), (right_edge, _))| left_edge + spacing - right_edge)
        .fold(f32::NEG_INFINITY, f32::max)
}

fn merge(into: &mut Contour, contour: &Contour, shift: f32) {
    for (level, (left, right)) in contour.iter().enumerate() {
        let (left, right) = (left + shift, right + shift);
        match into.get_mut(level) {
            Some(existing) => {
                existing.0 = existing.0.min(left);
                existing.1 = existing.1.max(right);
            }
            None => into.push((left, right)),
        }
    }
}

/// Positions along the growth axis for each depth, given the per-depth sizes.
pub(super) fn depth_offsets(sizes: &[f32], spacing: f32) -> Vec<f32> {
    let mut offsets = Vec::with_capacity(sizes.len());
    let mut current = 0.0f32;
    for (depth, size) in sizes.iter().enumerate() {
        if depth > 0 {
            current += (sizes[depth - 1] + size) / 2.0 + spacing;
        }
        offsets.push(current);
    }
    offsets
}
