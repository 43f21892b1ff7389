use familytree_core::{build_family_groups, export_gedcom, Person, Sex};

fn person(id: &str, last_name: &str, first_name: &str) -> Person {
    Person::new(id, last_name, first_name)
}

fn with_parents(mut person: Person, father: Option<&str>, mother: Option<&str>) -> Person {
    person.father_id = father.map(str::to_string);
    person.mother_id = mother.map(str::to_string);
    person
}

fn lines(text: &str) -> Vec<&str> {
    text.lines().collect()
}

#[test]
fn empty_input_exports_header_and_trailer_only() {
    let text = export_gedcom(&[]);
    let lines = lines(&text);

    assert_eq!(lines.first(), Some(&"0 HEAD"));
    assert_eq!(lines.last(), Some(&"0 TRLR"));
    assert!(lines.contains(&"1 SOUR FamilyTree"));
    assert!(lines.contains(&"2 VERS 5.5"));
    assert!(lines.contains(&"2 FORM LINEAGE-LINKED"));
    assert!(lines.contains(&"1 CHAR UTF-8"));
    assert!(!text.contains("INDI"));
    assert!(!text.contains("FAM"));
    assert!(text.ends_with("0 TRLR\n"));
}

#[test]
fn individual_record_carries_all_fields() {
    let mut grandpa = person("ABCD-EFG", "张", "大明");
    grandpa.birth_date = Some("1950-03-15".to_string());
    grandpa.birth_place = Some("北京".to_string());
    grandpa.death_date = Some("2020-06".to_string());
    grandpa.notes = Some("家族族长\n第二行".to_string());

    let text = export_gedcom(&[grandpa]);
    let expected = [
        "0 @I1@ INDI",
        "1 NAME 大明 /张/",
        "2 GIVN 大明",
        "2 SURN 张",
        "1 SEX M",
        "1 BIRT",
        "2 DATE 15 MAR 1950",
        "2 PLAC 北京",
        "1 DEAT",
        "2 DATE JUN 2020",
        "1 NOTE 家族族长",
        "2 CONT 第二行",
        "0 TRLR",
    ];
    let lines = lines(&text);
    let start = lines.iter().position(|line| *line == "0 @I1@ INDI").unwrap();
    assert_eq!(&lines[start..], &expected);
}

#[test]
fn events_without_data_are_omitted() {
    let mut female = person("P1", "李", "秀英");
    female.sex = Sex::Female;

    let text = export_gedcom(&[female]);
    assert!(text.contains("1 SEX F"));
    assert!(!text.contains("BIRT"));
    assert!(!text.contains("DEAT"));
    assert!(!text.contains("NOTE"));
}

#[test]
fn place_only_event_has_no_date_line() {
    let mut member = person("P1", "王", "美丽");
    member.birth_place = Some("杭州".to_string());

    let text = export_gedcom(&[member]);
    let lines = lines(&text);
    let birt = lines.iter().position(|line| *line == "1 BIRT").unwrap();
    assert_eq!(lines[birt + 1], "2 PLAC 杭州");
}

#[test]
fn families_are_rebuilt_from_parent_pairs() {
    let members = vec![
        person("D", "张", "大明"),
        person("M", "李", "秀英"),
        with_parents(person("S", "张", "小明"), Some("D"), Some("M")),
        with_parents(person("G", "张", "小红"), Some("D"), Some("M")),
    ];

    let text = export_gedcom(&members);
    let lines = lines(&text);
    let fam = lines.iter().position(|line| *line == "0 @F1@ FAM").unwrap();
    assert_eq!(
        &lines[fam..],
        &[
            "0 @F1@ FAM",
            "1 HUSB @I1@",
            "1 WIFE @I2@",
            "1 CHIL @I3@",
            "1 CHIL @I4@",
            "0 TRLR",
        ]
    );

    assert_eq!(text.matches("1 FAMS @F1@").count(), 2);
    assert_eq!(text.matches("1 FAMC @F1@").count(), 2);
    assert!(!text.contains("@F2@"));
}

#[test]
fn dangling_parent_reference_drops_only_that_line() {
    let members = vec![
        person("M", "李", "秀英"),
        with_parents(person("C", "张", "小明"), Some("GONE"), Some("M")),
    ];

    let text = export_gedcom(&members);
    assert!(text.contains("0 @F1@ FAM\n1 WIFE @I1@\n1 CHIL @I2@\n"));
    assert!(!text.contains("HUSB"));
}

#[test]
fn single_parent_groups_differ_from_full_pairs() {
    let members = vec![
        person("D", "张", "大明"),
        person("M", "李", "秀英"),
        with_parents(person("A", "张", "一"), Some("D"), Some("M")),
        with_parents(person("B", "张", "二"), Some("D"), None),
    ];

    let groups = build_family_groups(&members);
    assert_eq!(groups.len(), 2);

    let text = export_gedcom(&members);
    assert!(text.contains("0 @F2@ FAM\n1 HUSB @I1@\n1 CHIL @I4@\n"));
    // Father is a spouse in both families.
    let father = text.split("0 @I2@ INDI").next().unwrap();
    assert!(father.contains("1 FAMS @F1@\n1 FAMS @F2@\n"));
}

#[test]
fn unrecognized_dates_are_written_verbatim() {
    let mut member = person("P1", "孙", "");
    member.birth_date = Some("ABT 1900".to_string());
    member.death_date = Some("1985-13".to_string());

    let text = export_gedcom(&[member]);
    assert!(text.contains("1 NAME  /孙/"));
    assert!(text.contains("2 DATE ABT 1900"));
    assert!(text.contains("2 DATE 1985-13"));
}

#[test]
fn export_is_deterministic_for_the_same_input() {
    let members = vec![
        person("D", "张", "大明"),
        with_parents(person("S", "张", "小明"), Some("D"), None),
    ];

    assert_eq!(export_gedcom(&members), export_gedcom(&members));
}
