use cgmath::{BaseNum, Point2};
use quickcheck::{Arbitrary, Gen};

use super::Box2;

/// Generates valid (but possibly empty) boxes.
impl<T: BaseNum + Arbitrary> Arbitrary for Box2<T> {
    fn arbitrary<G: Gen>(g: &mut G) -> Self {
        let [x1, x2] = sorted(T::arbitrary(g), T::arbitrary(g));
        let [y1, y2] = sorted(T::arbitrary(g), T::arbitrary(g));
        Box2 {
            min: Point2::new(x1, y1),
            max: Point2::new(x2, y2),
        }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let (min, max) = (self.min, self.max);
        Box::new(
            (min.x, min.y, max.x, max.y)
                .shrink()
                .map(|(x1, y1, x2, y2)| Box2 {
                    min: Point2::new(x1, y1),
                    max: Point2::new(x2, y2),
                })
                .filter(|bx| bx.min.x <= bx.max.x && bx.min.y <= bx.max.y),
        )
    }
}

fn sorted<T: PartialOrd>(a: T, b: T) -> [T; 2] {
    if a <= b {
        [a, b]
    } else {
        [b, a]
    }
}
