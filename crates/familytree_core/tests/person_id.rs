use familytree_core::{
    generate_person_id, generate_person_id_with, is_valid_person_id, Person, PersonIdSource,
    RandomPersonIds, PERSON_ID_ALPHABET,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

#[test]
fn generated_ids_match_shape_and_alphabet() {
    for _ in 0..1000 {
        let id = generate_person_id();
        assert_eq!(id.len(), 8);
        assert_eq!(&id[4..5], "-");
        assert!(is_valid_person_id(&id), "bad id {id}");
    }
}

#[test]
fn generated_ids_are_practically_unique() {
    let ids: HashSet<String> = (0..1000).map(|_| generate_person_id()).collect();
    assert_eq!(ids.len(), 1000);
}

#[test]
fn every_alphabet_char_is_reachable() {
    let mut rng = StdRng::seed_from_u64(42);
    let seen: HashSet<u8> = (0..1000)
        .flat_map(|_| generate_person_id_with(&mut rng).into_bytes())
        .filter(|byte| *byte != b'-')
        .collect();

    let alphabet: HashSet<u8> = PERSON_ID_ALPHABET.iter().copied().collect();
    assert_eq!(seen, alphabet);
}

#[test]
fn seeded_source_is_reproducible() {
    let mut first = RandomPersonIds::with_rng(StdRng::seed_from_u64(7));
    let mut second = RandomPersonIds::with_rng(StdRng::seed_from_u64(7));

    let left: Vec<String> = (0..5).map(|_| first.next_id()).collect();
    let right: Vec<String> = (0..5).map(|_| second.next_id()).collect();
    assert_eq!(left, right);
    assert!(left.iter().all(|id| is_valid_person_id(id)));
}

#[test]
fn person_with_generated_id_has_valid_id() {
    let person = Person::with_generated_id("张", "三");
    assert!(is_valid_person_id(&person.id));
    assert_eq!(person.full_name(), "张三");
    assert!(person.validate().is_ok());
}
