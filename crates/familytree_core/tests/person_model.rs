use familytree_core::{Person, Sex};
use serde_json::json;

#[test]
fn person_serializes_with_snake_case_sex() {
    let mut person = Person::new("ABCD-EFG", "李", "秀英");
    person.sex = Sex::Female;
    person.birth_date = Some("1952-07-08".to_string());

    let value = serde_json::to_value(&person).unwrap();
    assert_eq!(value["id"], "ABCD-EFG");
    assert_eq!(value["last_name"], "李");
    assert_eq!(value["first_name"], "秀英");
    assert_eq!(value["sex"], "female");
    assert_eq!(value["birth_date"], "1952-07-08");
    assert_eq!(value["father_id"], serde_json::Value::Null);
}

#[test]
fn missing_sex_deserializes_as_male() {
    let value = json!({
        "id": "ABCD-EFG",
        "last_name": "张",
        "first_name": "三",
        "birth_date": null,
        "birth_place": null,
        "death_date": null,
        "death_place": null,
        "father_id": null,
        "mother_id": null,
        "notes": "第一行\n第二行"
    });

    let person: Person = serde_json::from_value(value).unwrap();
    assert_eq!(person.sex, Sex::Male);
    assert_eq!(person.notes.as_deref(), Some("第一行\n第二行"));
}

#[test]
fn unknown_sex_value_is_rejected_on_deserialize() {
    let value = json!({
        "id": "ABCD-EFG",
        "last_name": "",
        "first_name": "",
        "sex": "unknown",
        "birth_date": null,
        "birth_place": null,
        "death_date": null,
        "death_place": null,
        "father_id": null,
        "mother_id": null,
        "notes": null
    });

    assert!(serde_json::from_value::<Person>(value).is_err());
}

#[test]
fn sex_codes_are_consistent() {
    for sex in [Sex::Male, Sex::Female] {
        assert_eq!(Sex::from_gedcom(sex.gedcom_code()), sex);
        assert_eq!(Sex::parse(sex.as_str()), Some(sex));
    }
    assert_eq!(Sex::parse("other"), None);
}

#[test]
fn has_parents_reflects_either_slot() {
    let mut person = Person::new("P1", "张", "三");
    assert!(!person.has_parents());
    person.mother_id = Some("P2".to_string());
    assert!(person.has_parents());
}
