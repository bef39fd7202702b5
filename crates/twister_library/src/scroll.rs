/// A host resource that is shown one page (or item) at a time.
pub trait Scrollable {
    fn can_scroll_forward(&self) -> bool;
    fn item_count(&self) -> usize;
    fn scroll_forward(&mut self);
    fn scroll_by(&mut self, delta: i32);
}

/// Scrolls forward by one, wrapping back to the first item past the end.
pub fn circular_scroll_forward<S: Scrollable + ?Sized>(resource: &mut S) {
    if resource.can_scroll_forward() {
        resource.scroll_forward();
    } else {
        let back = resource.item_count().saturating_sub(1) as i32;
        resource.scroll_by(-back);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Pages {
        position: i32,
        count: usize,
        calls: Vec<i32>,
    }

    impl Scrollable for Pages {
        fn can_scroll_forward(&self) -> bool {
            (self.position as usize) + 1 < self.count
        }

        fn item_count(&self) -> usize {
            self.count
        }

        fn scroll_forward(&mut self) {
            self.scroll_by(1);
        }

        fn scroll_by(&mut self, delta: i32) {
            self.calls.push(delta);
            self.position += delta;
        }
    }

    #[test]
    fn test_wraps_at_end() {
        let mut pages = Pages { position: 4, count: 5, ..Default::default() };
        circular_scroll_forward(&mut pages);
        assert_eq!(pages.calls, vec![-4]);
        assert_eq!(pages.position, 0);
    }

    #[test]
    fn test_steps_forward() {
        let mut pages = Pages { position: 0, count: 3, ..Default::default() };
        for _ in 0..4 {
            circular_scroll_forward(&mut pages);
        }
        assert_eq!(pages.calls, vec![1, 1, -2, 1]);
        assert_eq!(pages.position, 1);
    }

    #[test]
    fn test_empty_resource() {
        let mut pages = Pages::default();
        circular_scroll_forward(&mut pages);
        assert_eq!(pages.calls, vec![0]);
    }
}
