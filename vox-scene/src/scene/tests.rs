use euclid::{point3, vec3};
use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;

fn transform_node(frame: &[(&str, &str)]) -> TransformNode {
    TransformNode {
        id: 7,
        attributes: Dict::new(),
        child_id: 1,
        reserved_id: -1,
        layer_id: 0,
        frame_attributes: vec![Dict::from_iter(frame.iter().copied())],
    }
}

#[test]
fn rotation_identity_byte() {
    assert_eq!(Rotation::from_byte(4), Some(Rotation::IDENTITY));
    assert_eq!(Rotation::IDENTITY.to_byte(), 4);
}

#[rstest]
#[case::first_column_out_of_range(0b0000_0011)]
#[case::second_column_out_of_range(0b0000_1100)]
#[case::same_column(0b0000_0101)]
fn rotation_invalid_byte(#[case] byte: u8) {
    assert_eq!(Rotation::from_byte(byte), None);
}

#[test]
fn rotation_byte_round_trip() {
    let valid: Vec<Rotation> = (0..128).filter_map(Rotation::from_byte).collect();
    assert_eq!(valid.len(), 48);
    for rotation in valid {
        assert_eq!(Rotation::from_byte(rotation.to_byte()), Some(rotation));
        // Each row and column has exactly one nonzero entry.
        let rows = rotation.rows();
        for i in 0..3 {
            assert_eq!(rows[i].iter().filter(|&&e| e != 0).count(), 1);
            assert_eq!(rows.iter().filter(|row| row[i] != 0).count(), 1);
        }
    }
}

#[test]
fn rotation_about_z() {
    let rotation = Rotation::from_byte(0b0001_0001).unwrap();
    assert_eq!(rotation.rows(), [[0, -1, 0], [1, 0, 0], [0, 0, 1]]);
    assert_eq!(
        rotation.checked_transform_vector(vec3(1, 0, 0)),
        Some(vec3(0, 1, 0))
    );
    assert_eq!(
        rotation.checked_transform_vector(vec3(0, 1, 0)),
        Some(vec3(-1, 0, 0))
    );

    let half_turn = rotation * rotation;
    assert_eq!(
        half_turn.checked_transform_vector(vec3(1, 2, 3)),
        Some(vec3(-1, -2, 3))
    );
    assert_eq!(half_turn * half_turn, Rotation::IDENTITY);
}

#[test]
fn rotation_overflow() {
    let rotation = Rotation::from_byte(0b0001_0001).unwrap();
    assert_eq!(rotation.checked_transform_vector(vec3(0, i32::MIN, 0)), None);
    assert_eq!(
        rotation.checked_transform_vector(vec3(i32::MIN, i32::MAX, 0)),
        Some(vec3(-i32::MAX, i32::MIN, 0))
    );
}

#[test]
fn transform_composition() {
    let parent = Transform {
        rotation: Rotation::from_byte(0b0001_0001).unwrap(),
        translation: vec3(1, 2, 3),
    };
    let child = Transform {
        rotation: Rotation::IDENTITY,
        translation: vec3(10, 0, 0),
    };
    let composed = parent.checked_mul(child).unwrap();
    assert_eq!(composed.translation, vec3(1, 12, 3));

    let point = point3(4, 5, 6);
    assert_eq!(
        composed.checked_transform_point(point),
        child
            .checked_transform_point(point)
            .and_then(|p| parent.checked_transform_point(p))
    );
    assert_eq!(Transform::IDENTITY.checked_mul(parent), Some(parent));
    assert_eq!(parent.checked_mul(Transform::IDENTITY), Some(parent));
}

#[test]
fn transform_overflow() {
    let far = Transform {
        rotation: Rotation::IDENTITY,
        translation: vec3(0, 0, i32::MAX),
    };
    let step = Transform {
        rotation: Rotation::IDENTITY,
        translation: vec3(0, 0, 1),
    };
    assert_eq!(far.checked_mul(step), None);
    assert_eq!(step.checked_mul(far), None);
    assert_eq!(far.checked_transform_point(point3(0, 0, 1)), None);
    assert_eq!(
        far.checked_transform_point(point3(0, 0, -1)),
        Some(point3(0, 0, i32::MAX - 1))
    );
}

#[test]
fn frame_transform_parsing() {
    assert_eq!(
        transform_node(&[("_t", "-1 0 25"), ("_r", "4")]).frame_transform(0),
        Ok(Transform {
            rotation: Rotation::IDENTITY,
            translation: vec3(-1, 0, 25),
        })
    );
    assert_eq!(
        transform_node(&[]).frame_transform(0),
        Ok(Transform::IDENTITY)
    );
    assert_eq!(
        transform_node(&[("_t", "1 2 3")]).frame_transform(5),
        Ok(Transform::IDENTITY)
    );
}

#[rstest]
#[case("_t", "1 2")]
#[case("_t", "1 2 3 4")]
#[case("_t", "a b c")]
#[case("_r", "-1")]
#[case("_r", "300")]
#[case("_r", "15")]
fn frame_transform_parse_error(#[case] attribute: &'static str, #[case] value: &str) {
    assert_eq!(
        transform_node(&[(attribute, value)]).frame_transform(0),
        Err(SceneError::SceneAttributeParse {
            node_id: 7,
            attribute
        })
    );
}

#[rstest]
#[case("_diffuse", MaterialKind::Diffuse)]
#[case("_metal", MaterialKind::Metal)]
#[case("_glass", MaterialKind::Glass)]
#[case("_emit", MaterialKind::Emit)]
#[case("_blend", MaterialKind::Blend)]
#[case("_media", MaterialKind::Media)]
#[case("_cloud", MaterialKind::Cloud)]
#[case("_plastic", MaterialKind::Other("_plastic".into()))]
fn material_kind(#[case] value: &str, #[case] expected: MaterialKind) {
    let material = Material {
        id: 1,
        properties: Dict::from_iter([("_type", value)]),
    };
    assert_eq!(material.kind(), Some(expected));
}

#[test]
fn material_numbers() {
    let material = Material {
        id: 1,
        properties: Dict::from_iter([
            ("_weight", "0.5"),
            ("_spec", "1"),
            ("_att", "0.125"),
            ("_flux", "2"),
            ("_emit", "0.75"),
            ("_metal", " 0.25 "),
            ("_alpha", "nope"),
        ]),
    };
    assert_eq!(material.kind(), None);
    assert_eq!(material.weight(), Some(0.5));
    assert_eq!(material.specular(), Some(1.0));
    assert_eq!(material.attenuation(), Some(0.125));
    assert_eq!(material.flux(), Some(2.0));
    assert_eq!(material.emission(), Some(0.75));
    assert_eq!(material.metalness(), Some(0.25));
    assert_eq!(material.alpha(), None);
    assert_eq!(material.roughness(), None);
    assert_eq!(material.smoothness(), None);
}

#[test]
fn hidden_requires_exactly_one() {
    let group = |hidden: &str| GroupNode {
        id: 0,
        attributes: Dict::from_iter([("_hidden", hidden)]),
        child_ids: vec![],
    };
    assert!(group("1").is_hidden());
    assert!(!group("0").is_hidden());
    assert!(!group("true").is_hidden());
    assert!(
        !ShapeNode {
            id: 0,
            attributes: Dict::new(),
            models: vec![]
        }
        .is_hidden()
    );
}
