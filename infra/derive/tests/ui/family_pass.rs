use sealed_enum::{Family, Seal, Variant};

pub trait Shape: Send + Sync {
    fn corners(&self) -> usize;
}

#[derive(Family)]
#[family(member = dyn Shape, variants(Triangle, Square), init = Polygon::build)]
pub struct Polygon {
    seal: Seal<Self>,
    label: &'static str,
}

impl Polygon {
    fn build(seal: Seal<Self>) -> Result<Self, sealed_enum::SealedError> {
        Ok(Self { seal, label: "polygon" })
    }
}

#[derive(Variant)]
#[variant(family = Polygon)]
pub struct Triangle {
    seal: Seal<Polygon>,
    visits: u32,
}

#[derive(Variant)]
#[variant(family = Polygon)]
pub struct Square {
    seal: Seal<Polygon>,
}

impl Shape for Triangle {
    fn corners(&self) -> usize {
        3
    }
}

impl Shape for Square {
    fn corners(&self) -> usize {
        4
    }
}

fn main() {
    let polygon = sealed_enum::family::<Polygon>().unwrap();
    assert_eq!(polygon.label, "polygon");
    assert_eq!(polygon.get::<Triangle>().unwrap().visits, 0);

    let corners: Vec<usize> = polygon.values().iter().map(|v| v.corners()).collect();
    assert_eq!(corners, [3, 4]);
}
