//! WCAG success criterion tags cross-referenced to RGAA 4.1 criteria

/// Criterion id for violations with no mapped tag
pub const UNMAPPED: &str = "unmapped";

/// Number of RGAA 4.1 criteria
pub const RGAA_CRITERIA_COUNT: u32 = 106;

/// (WCAG tag, RGAA criteria)
pub const WCAG_TO_RGAA: &[(&str, &[&str])] = &[
    ("wcag111", &["1.1", "1.2", "1.3"]),
    ("wcag121", &["4.1"]),
    ("wcag122", &["4.3"]),
    ("wcag131", &["5.6", "9.1", "11.2"]),
    ("wcag132", &["10.3"]),
    ("wcag141", &["3.1"]),
    ("wcag143", &["3.2"]),
    ("wcag144", &["10.4"]),
    ("wcag211", &["7.3", "12.9"]),
    ("wcag222", &["13.8"]),
    ("wcag241", &["12.7"]),
    ("wcag242", &["8.5", "8.6"]),
    ("wcag243", &["12.8"]),
    ("wcag244", &["6.1"]),
    ("wcag246", &["9.1", "11.2"]),
    ("wcag247", &["10.7"]),
    ("wcag311", &["8.3", "8.4"]),
    ("wcag312", &["8.7"]),
    ("wcag332", &["11.1", "11.2"]),
    ("wcag411", &["8.2"]),
    ("wcag412", &["2.1", "7.1", "11.9"]),
];

/// RGAA criteria for a violation's tags, or [`UNMAPPED`] when none map
pub fn criteria_for_tags(tags: &[String]) -> Vec<&'static str> {
    let mut criteria: Vec<&'static str> = Vec::new();

    for tag in tags {
        let tag = tag.to_lowercase();
        if let Some((_, mapped)) = WCAG_TO_RGAA.iter().find(|(wcag, _)| *wcag == tag) {
            for criterion in mapped.iter() {
                if !criteria.contains(criterion) {
                    criteria.push(*criterion);
                }
            }
        }
    }

    if criteria.is_empty() {
        criteria.push(UNMAPPED);
    }
    criteria
}
