/// Index into a diary's image list that wraps at both ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Carousel {
    len: usize,
    index: usize,
}

impl Carousel {
    pub fn new(len: usize) -> Self {
        Self { len, index: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn current(&self) -> Option<usize> {
        (!self.is_empty()).then_some(self.index)
    }

    /// Arrows are only drawn when there is somewhere to go.
    pub fn has_navigation(&self) -> bool {
        self.len > 1
    }

    pub fn next(&mut self) {
        if self.has_navigation() {
            self.index = (self.index + 1) % self.len;
        }
    }

    pub fn previous(&mut self) {
        if self.has_navigation() {
            self.index = if self.index == 0 {
                self.len - 1
            } else {
                self.index - 1
            };
        }
    }

    /// "3 / 7", one-based.
    pub fn position_label(&self) -> Option<String> {
        self.current()
            .map(|index| format!("{} / {}", index + 1, self.len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_forward_and_backward() {
        let mut carousel = Carousel::new(3);
        carousel.previous();
        assert_eq!(carousel.current(), Some(2));

        carousel.next();
        assert_eq!(carousel.current(), Some(0));

        carousel.next();
        carousel.next();
        assert_eq!(carousel.position_label().as_deref(), Some("3 / 3"));
    }

    #[test]
    fn single_image_never_moves() {
        let mut carousel = Carousel::new(1);
        assert!(!carousel.has_navigation());
        carousel.next();
        carousel.previous();
        assert_eq!(carousel.current(), Some(0));
    }

    #[test]
    fn empty_carousel_has_no_position() {
        let mut carousel = Carousel::new(0);
        carousel.next();
        assert_eq!(carousel.current(), None);
        assert_eq!(carousel.position_label(), None);
    }
}
