//! Placement of card images on a fixed 3x3 grid per page.
//!
//! All positions are in inches from the bottom-left corner of a US legal
//! page, the origin PDF drawing uses.

pub const COLUMNS: usize = 3;
pub const ROWS: usize = 3;
pub const SLOTS_PER_PAGE: usize = COLUMNS * ROWS;

pub const PAGE_WIDTH_IN: f64 = 8.5;
pub const PAGE_HEIGHT_IN: f64 = 14.0;

/// Trading card size plus a small bleed.
pub const CARD_WIDTH_IN: f64 = 2.5;
pub const CARD_HEIGHT_IN: f64 = 3.48;

const COLUMN_X_IN: [f64; COLUMNS] = [0.25, 3.0, 5.75];
const ROW_Y_IN: [f64; ROWS] = [0.25, 4.0, 7.75];

pub const MM_PER_INCH: f64 = 25.4;

/// Where and how large one image is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x_in: f64,
    pub y_in: f64,
    pub width_in: f64,
    pub height_in: f64,
}

/// Placement of slot `slot` (0..9) on a page, or `None` outside the grid.
pub fn slot_placement(slot: usize) -> Option<Placement> {
    if slot >= SLOTS_PER_PAGE {
        return None;
    }
    Some(Placement {
        x_in: COLUMN_X_IN[slot % COLUMNS],
        y_in: ROW_Y_IN[slot / COLUMNS],
        width_in: CARD_WIDTH_IN,
        height_in: CARD_HEIGHT_IN,
    })
}

/// Pages needed for `image_count` images. An empty deck still gets one page.
pub fn page_count(image_count: usize) -> usize {
    image_count.div_ceil(SLOTS_PER_PAGE).max(1)
}

/// One image's position in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct GridPosition {
    pub page: usize,
    /// Slot within the page grid (0-8)
    pub slot: usize,
    /// Index into the image list being laid out
    pub image_index: usize,
    pub placement: Placement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    pub index: usize,
    pub positions: Vec<GridPosition>,
}

impl PagePlan {
    pub fn is_blank(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Assign every image index to a page and slot. Depends only on the count,
/// so laying out the same list twice gives the same plan.
pub fn plan_pages(image_count: usize) -> Vec<PagePlan> {
    (0..page_count(image_count))
        .map(|page| {
            let start = page * SLOTS_PER_PAGE;
            let end = ((page + 1) * SLOTS_PER_PAGE).min(image_count);
            let positions = (start..end)
                .filter_map(|image_index| {
                    let slot = image_index - start;
                    slot_placement(slot).map(|placement| GridPosition {
                        page,
                        slot,
                        image_index,
                        placement,
                    })
                })
                .collect();
            PagePlan { index: page, positions }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_page_count_rounds_up_with_minimum_one() {
        assert_eq!(page_count(0), 1);
        assert_eq!(page_count(1), 1);
        assert_eq!(page_count(9), 1);
        assert_eq!(page_count(10), 2);
        assert_eq!(page_count(18), 2);
        assert_eq!(page_count(19), 3);
    }

    #[test]
    fn test_slot_positions() {
        let expected = [
            (0.25, 0.25),
            (3.0, 0.25),
            (5.75, 0.25),
            (0.25, 4.0),
            (3.0, 4.0),
            (5.75, 4.0),
            (0.25, 7.75),
            (3.0, 7.75),
            (5.75, 7.75),
        ];
        for (slot, (x, y)) in expected.iter().enumerate() {
            let placement = slot_placement(slot).unwrap();
            assert_eq!((placement.x_in, placement.y_in), (*x, *y), "slot {}", slot);
            assert_eq!(placement.width_in, 2.5);
            assert_eq!(placement.height_in, 3.48);
        }
        assert_eq!(slot_placement(9), None);
    }

    #[test]
    fn test_no_two_slots_share_a_position() {
        let positions: HashSet<(u64, u64)> = (0..SLOTS_PER_PAGE)
            .map(|slot| {
                let p = slot_placement(slot).unwrap();
                (p.x_in.to_bits(), p.y_in.to_bits())
            })
            .collect();
        assert_eq!(positions.len(), SLOTS_PER_PAGE);
    }

    #[test]
    fn test_cards_fit_on_the_page() {
        for slot in 0..SLOTS_PER_PAGE {
            let p = slot_placement(slot).unwrap();
            assert!(p.x_in + p.width_in <= PAGE_WIDTH_IN);
            assert!(p.y_in + p.height_in <= PAGE_HEIGHT_IN);
        }
    }

    #[test]
    fn test_empty_deck_is_one_blank_page() {
        let plan = plan_pages(0);
        assert_eq!(plan.len(), 1);
        assert!(plan[0].is_blank());
    }

    #[test]
    fn test_two_images_share_the_bottom_row() {
        let plan = plan_pages(2);
        assert_eq!(plan.len(), 1);
        let placements: Vec<(f64, f64)> = plan[0]
            .positions
            .iter()
            .map(|p| (p.placement.x_in, p.placement.y_in))
            .collect();
        assert_eq!(placements, vec![(0.25, 0.25), (3.0, 0.25)]);
    }

    #[test]
    fn test_tenth_image_starts_a_new_page() {
        let plan = plan_pages(10);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].positions.len(), 9);
        assert_eq!(plan[1].positions.len(), 1);
        assert_eq!(plan[1].positions[0].slot, 0);
        assert_eq!(plan[1].positions[0].image_index, 9);
        assert_eq!(plan[1].positions[0].page, 1);
    }

    #[test]
    fn test_every_image_is_placed_exactly_once() {
        for count in [1, 8, 9, 17, 27, 28] {
            let plan = plan_pages(count);
            let indices: Vec<usize> = plan
                .iter()
                .flat_map(|page| page.positions.iter().map(|p| p.image_index))
                .collect();
            assert_eq!(indices, (0..count).collect::<Vec<_>>());
            assert_eq!(plan.len(), page_count(count));
        }
    }

    #[test]
    fn test_planning_is_repeatable() {
        assert_eq!(plan_pages(23), plan_pages(23));
    }
}
