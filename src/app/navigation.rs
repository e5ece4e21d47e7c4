/// Wrapping selection over a list shown on screen.
///
/// Screens implement this on a short-lived borrowing wrapper so each list
/// keeps its own index field on `App`.
pub trait Navigable {
    fn get_item_count(&self) -> usize;

    fn get_selected_index(&self) -> usize;

    fn set_selected_index(&mut self, index: usize);

    /// Wraps to the first item.
    fn next_item(&mut self) {
        let count = self.get_item_count();
        if count > 0 {
            let next = (self.get_selected_index() + 1) % count;
            self.set_selected_index(next);
        }
    }

    /// Wraps to the last item.
    fn previous_item(&mut self) {
        let count = self.get_item_count();
        if count > 0 {
            let current = self.get_selected_index().min(count - 1);
            let previous = if current == 0 { count - 1 } else { current - 1 };
            self.set_selected_index(previous);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct List {
        len: usize,
        index: usize,
    }

    impl Navigable for List {
        fn get_item_count(&self) -> usize {
            self.len
        }

        fn get_selected_index(&self) -> usize {
            self.index
        }

        fn set_selected_index(&mut self, index: usize) {
            self.index = index;
        }
    }

    #[test]
    fn test_wraps_both_ways() {
        let mut list = List { len: 3, index: 2 };
        list.next_item();
        assert_eq!(list.index, 0);
        list.previous_item();
        assert_eq!(list.index, 2);
    }

    #[test]
    fn test_stale_index_after_shrink() {
        // A filter can shrink the list under the cursor.
        let mut list = List { len: 2, index: 5 };
        list.previous_item();
        assert_eq!(list.index, 0);
        let mut empty = List { len: 0, index: 0 };
        empty.next_item();
        assert_eq!(empty.index, 0);
    }
}
