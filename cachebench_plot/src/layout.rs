use cachebench::stats;

/// Placement of grouped boxes (or bars) along the x axis: one group per
/// policy variant and one member per storage type, thread count or version.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupLayout {
    spacing: f64,
    width: f64,
    shift: f64,
}

impl GroupLayout {
    /// Groups start every `spacing` units; members are one unit apart.
    pub fn new(spacing: f64) -> Self {
        Self {
            spacing,
            width: 1.0,
            shift: 0.0,
        }
    }

    /// Distance between consecutive members.
    pub fn width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    /// Offset of the first member from the group start, in member widths.
    pub fn shift(mut self, shift: f64) -> Self {
        self.shift = shift;
        self
    }

    pub fn position(&self, group: usize, member: usize) -> f64 {
        group as f64 * self.spacing + (member as f64 + self.shift) * self.width
    }

    /// Middle of the members of a group, where its tick label goes.
    pub fn center(&self, group: usize, members: usize) -> f64 {
        let middle = members.saturating_sub(1) as f64 / 2.0;
        group as f64 * self.spacing + (middle + self.shift) * self.width
    }

    /// Places `groups[group][member]`; members without values are skipped
    /// but still take their slot.
    pub fn place(&self, groups: Vec<Vec<Vec<f64>>>) -> GroupedBoxes {
        let group_count = groups.len();
        let members = groups.iter().map(Vec::len).max().unwrap_or(0);
        let mut boxes = Vec::new();
        for (group, group_values) in groups.into_iter().enumerate() {
            for (member, values) in group_values.into_iter().enumerate() {
                if values.is_empty() {
                    continue;
                }
                boxes.push(PlacedBox {
                    group,
                    member,
                    position: self.position(group, member),
                    values,
                });
            }
        }
        let centers = (0..group_count)
            .map(|group| self.center(group, members))
            .collect();
        GroupedBoxes { boxes, centers }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedBox {
    pub group: usize,
    pub member: usize,
    pub position: f64,
    pub values: Vec<f64>,
}

impl PlacedBox {
    pub fn median(&self) -> f64 {
        stats::median(&self.values).unwrap_or(f64::NAN)
    }

    pub fn max(&self) -> f64 {
        stats::max(&self.values).unwrap_or(f64::NAN)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedBoxes {
    boxes: Vec<PlacedBox>,
    centers: Vec<f64>,
}

impl GroupedBoxes {
    pub fn boxes(&self) -> &[PlacedBox] {
        &self.boxes
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Tick position of each group, including groups without boxes.
    pub fn centers(&self) -> &[f64] {
        &self.centers
    }

    pub fn positions(&self) -> Vec<f64> {
        self.boxes.iter().map(|placed| placed.position).collect()
    }

    pub fn values(&self) -> Vec<Vec<f64>> {
        self.boxes.iter().map(|placed| placed.values.clone()).collect()
    }

    pub fn members(&self) -> Vec<usize> {
        self.boxes.iter().map(|placed| placed.member).collect()
    }

    /// The box with the highest median of each member, e.g. the best policy
    /// on each storage type. The first box wins ties.
    pub fn best_per_member(&self) -> Vec<&PlacedBox> {
        let mut best: Vec<&PlacedBox> = Vec::new();
        for placed in &self.boxes {
            match best.iter_mut().find(|other| other.member == placed.member) {
                Some(other) => {
                    if placed.median() > other.median() {
                        *other = placed;
                    }
                }
                None => best.push(placed),
            }
        }
        best.sort_by_key(|placed| placed.member);
        best
    }

    /// Largest value within a group.
    pub fn group_max(&self, group: usize) -> Option<f64> {
        let values: Vec<_> = self
            .boxes
            .iter()
            .filter(|placed| placed.group == group)
            .flat_map(|placed| placed.values.iter().copied())
            .collect();
        stats::max(&values)
    }

    /// Smallest and largest value over all boxes.
    pub fn range(&self) -> Option<(f64, f64)> {
        let values: Vec<_> = self
            .boxes
            .iter()
            .flat_map(|placed| placed.values.iter().copied())
            .collect();
        Some((stats::min(&values)?, stats::max(&values)?))
    }
}

/// Pads a `(min, max)` range below and above by fractions of its width.
pub fn padded_range(
    (min, max): (f64, f64),
    below: f64,
    above: f64,
) -> (f64, f64) {
    let width = max - min;
    (min - width * below, max + width * above)
}
