//! Cart aggregate.
//!
//! The running `total_price` is maintained incrementally by every mutation and
//! must always equal the sum of `count * unit_price` over the lines. Each
//! mutation returns the [`LineChange`] the caller has to persist.

use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub id: Uuid,
    pub product_id: Uuid,
    pub unit_price: i64,
    pub count: i32,
}

impl CartLine {
    pub fn line_price(&self) -> i64 {
        self.unit_price * i64::from(self.count)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LineChange {
    Inserted(CartLine),
    CountChanged { line_id: Uuid, count: i32 },
    Removed { line_id: Uuid },
}

#[derive(Debug, Clone)]
pub struct Cart {
    pub id: Uuid,
    pub member_id: Uuid,
    total_price: i64,
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new(id: Uuid, member_id: Uuid) -> Self {
        Self::from_parts(id, member_id, 0, Vec::new())
    }

    /// Rebuilds the aggregate from stored rows, lines in insertion order.
    pub fn from_parts(id: Uuid, member_id: Uuid, total_price: i64, lines: Vec<CartLine>) -> Self {
        Self {
            id,
            member_id,
            total_price,
            lines,
        }
    }

    pub fn total_price(&self) -> i64 {
        self.total_price
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn recomputed_total(&self) -> i64 {
        self.lines.iter().map(CartLine::line_price).sum()
    }

    /// Replaces a drifted running total (e.g. after a price change) with the recomputed one.
    /// Returns whether anything changed.
    pub fn resync_total(&mut self) -> bool {
        let recomputed = self.recomputed_total();
        if recomputed == self.total_price {
            return false;
        }
        self.total_price = recomputed;
        true
    }

    /// Adds `count` units of a product. An existing line for the product is
    /// incremented instead of duplicated.
    pub fn add_line(&mut self, product_id: Uuid, unit_price: i64, count: i32) -> AppResult<LineChange> {
        if count < 1 {
            return Err(AppError::validation("count must be at least 1"));
        }
        let contribution = unit_price
            .checked_mul(i64::from(count))
            .ok_or_else(|| AppError::validation("line price overflow"))?;

        let change = match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.count = line
                    .count
                    .checked_add(count)
                    .ok_or_else(|| AppError::validation("count overflow"))?;
                line.unit_price = unit_price;
                LineChange::CountChanged {
                    line_id: line.id,
                    count: line.count,
                }
            }
            None => {
                let line = CartLine {
                    id: Uuid::new_v4(),
                    product_id,
                    unit_price,
                    count,
                };
                self.lines.push(line.clone());
                LineChange::Inserted(line)
            }
        };
        self.total_price += contribution;
        Ok(change)
    }

    /// Sets a line's count. Zero removes the line and its contribution.
    pub fn edit_line(&mut self, product_id: Uuid, new_count: i32) -> AppResult<LineChange> {
        if new_count < 0 {
            return Err(AppError::validation("count must not be negative"));
        }
        let idx = self
            .lines
            .iter()
            .position(|l| l.product_id == product_id)
            .ok_or(AppError::NotFound("cart line"))?;

        if new_count == 0 {
            let line = self.lines.remove(idx);
            self.total_price -= line.line_price();
            return Ok(LineChange::Removed { line_id: line.id });
        }

        let line = &mut self.lines[idx];
        let delta = i64::from(new_count - line.count) * line.unit_price;
        line.count = new_count;
        self.total_price += delta;
        Ok(LineChange::CountChanged {
            line_id: line.id,
            count: new_count,
        })
    }

    /// Empties the cart after checkout.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.total_price = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart() -> Cart {
        Cart::new(Uuid::new_v4(), Uuid::new_v4())
    }

    #[test]
    fn adding_same_product_twice_merges_lines() {
        let mut c = cart();
        let chair = Uuid::new_v4();
        assert!(matches!(c.add_line(chair, 100, 3).unwrap(), LineChange::Inserted(_)));
        let change = c.add_line(chair, 100, 4).unwrap();

        assert_eq!(c.lines().len(), 1);
        assert_eq!(c.lines()[0].count, 7);
        assert!(matches!(change, LineChange::CountChanged { count: 7, .. }));
        assert_eq!(c.total_price(), 700);
    }

    #[test]
    fn total_tracks_every_mutation() {
        let mut c = cart();
        let (chair, table, bed) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        c.add_line(chair, 100, 2).unwrap();
        c.add_line(table, 250, 1).unwrap();
        c.add_line(bed, 1_000, 1).unwrap();
        c.edit_line(table, 4).unwrap();
        c.add_line(chair, 100, 1).unwrap();
        c.edit_line(bed, 0).unwrap();
        c.edit_line(chair, 1).unwrap();

        assert_eq!(c.total_price(), c.recomputed_total());
        assert_eq!(c.total_price(), 100 + 250 * 4);
    }

    #[test]
    fn editing_to_zero_removes_line_and_its_contribution() {
        let mut c = cart();
        let (chair, table) = (Uuid::new_v4(), Uuid::new_v4());
        c.add_line(chair, 100, 2).unwrap();
        c.add_line(table, 300, 1).unwrap();

        let change = c.edit_line(chair, 0).unwrap();

        assert!(matches!(change, LineChange::Removed { .. }));
        assert_eq!(c.lines().len(), 1);
        assert_eq!(c.total_price(), 300);
    }

    #[test]
    fn lines_keep_insertion_order() {
        let mut c = cart();
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        for id in &ids {
            c.add_line(*id, 10, 1).unwrap();
        }
        let order: Vec<Uuid> = c.lines().iter().map(|l| l.product_id).collect();
        assert_eq!(order, ids);
    }

    #[test]
    fn rejects_bad_counts_and_unknown_lines() {
        let mut c = cart();
        let chair = Uuid::new_v4();
        assert!(matches!(c.add_line(chair, 100, 0), Err(AppError::Validation(_))));
        assert!(matches!(c.edit_line(chair, 1), Err(AppError::NotFound(_))));
        c.add_line(chair, 100, 1).unwrap();
        assert!(matches!(c.edit_line(chair, -1), Err(AppError::Validation(_))));
        assert_eq!(c.total_price(), 100);
    }

    #[test]
    fn resync_fixes_a_drifted_total() {
        let chair = Uuid::new_v4();
        let line = CartLine {
            id: Uuid::new_v4(),
            product_id: chair,
            unit_price: 120,
            count: 2,
        };
        let mut c = Cart::from_parts(Uuid::new_v4(), Uuid::new_v4(), 200, vec![line]);
        assert!(c.resync_total());
        assert_eq!(c.total_price(), 240);
        assert!(!c.resync_total());
    }

    #[test]
    fn removing_a_repriced_line_after_resync_leaves_zero() {
        let chair = Uuid::new_v4();
        let line = CartLine {
            id: Uuid::new_v4(),
            product_id: chair,
            unit_price: 1_000,
            count: 1,
        };
        let mut c = Cart::from_parts(Uuid::new_v4(), Uuid::new_v4(), 100, vec![line]);
        c.resync_total();
        c.edit_line(chair, 0).unwrap();
        assert_eq!(c.total_price(), 0);
    }

    #[test]
    fn clear_resets_lines_and_total() {
        let mut c = cart();
        c.add_line(Uuid::new_v4(), 100, 2).unwrap();
        c.clear();
        assert!(c.is_empty());
        assert_eq!(c.total_price(), 0);
    }
}
