use std::cmp::Ordering;

use crate::store::StudentRecord;

/// Filter inputs as they arrive from the UI. Empty strings and the "all"
/// sentinel impose no constraint.
#[derive(Debug, Clone, Default)]
pub struct RosterFilter {
    pub class_value: String,
    pub section_value: String,
    pub query_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    RollNumber,
    Class,
    Section,
    AdmissionNumber,
    FeeStatus,
    Attendance,
}

impl SortField {
    pub fn parse(s: &str) -> Option<SortField> {
        match s {
            "name" => Some(SortField::Name),
            "rollNumber" => Some(SortField::RollNumber),
            "class" => Some(SortField::Class),
            "section" => Some(SortField::Section),
            "admissionNumber" => Some(SortField::AdmissionNumber),
            "feeStatus" => Some(SortField::FeeStatus),
            "attendance" => Some(SortField::Attendance),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::RollNumber => "rollNumber",
            SortField::Class => "class",
            SortField::Section => "section",
            SortField::AdmissionNumber => "admissionNumber",
            SortField::FeeStatus => "feeStatus",
            SortField::Attendance => "attendance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(s: &str) -> Option<SortDirection> {
        match s {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Header-click rule: clicking the active sort field flips its direction;
/// clicking a different field selects it and resets direction to asc.
pub fn toggle_sort(
    active: SortField,
    direction: SortDirection,
    clicked: SortField,
) -> (SortField, SortDirection) {
    if clicked == active {
        let flipped = match direction {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        };
        (active, flipped)
    } else {
        (clicked, SortDirection::Asc)
    }
}

fn unconstrained(v: &str) -> bool {
    v.is_empty() || v == "all"
}

fn matches_query(record: &StudentRecord, lower_query: &str) -> bool {
    record.name.to_lowercase().contains(lower_query)
        || record.roll_number.to_lowercase().contains(lower_query)
        || record.admission_number.to_lowercase().contains(lower_query)
}

/// Conjunctive filter over class, section and free-text query. Returns a
/// subsequence of `records` preserving their relative order.
pub fn filter<'a>(records: &'a [StudentRecord], f: &RosterFilter) -> Vec<&'a StudentRecord> {
    let lower_query = f.query_text.to_lowercase();
    records
        .iter()
        .filter(|r| unconstrained(&f.class_value) || r.class == f.class_value)
        .filter(|r| unconstrained(&f.section_value) || r.section == f.section_value)
        .filter(|r| lower_query.is_empty() || matches_query(r, &lower_query))
        .collect()
}

/// Collation key for text sorting: case folded, common Latin diacritics
/// folded. A fixed root-locale approximation so ordering is identical on
/// every platform, unlike the locale-dependent comparator it replaces.
pub fn collation_key(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        for lc in c.to_lowercase() {
            out.push(fold_diacritic(lc));
        }
    }
    out
}

fn fold_diacritic(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' => 'e',
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' => 'i',
        'ñ' | 'ń' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' => 'o',
        'ù' | 'ú' | 'û' | 'ü' | 'ū' => 'u',
        'ý' | 'ÿ' => 'y',
        'ś' | 'š' => 's',
        'ź' | 'ż' | 'ž' => 'z',
        _ => c,
    }
}

fn field_text(record: &StudentRecord, field: SortField) -> &str {
    match field {
        SortField::Name => &record.name,
        SortField::RollNumber => &record.roll_number,
        SortField::Class => &record.class,
        SortField::Section => &record.section,
        SortField::AdmissionNumber => &record.admission_number,
        SortField::FeeStatus => record.fee_status.as_str(),
        SortField::Attendance => "",
    }
}

fn compare_asc(a: &StudentRecord, b: &StudentRecord, field: SortField) -> Ordering {
    if field == SortField::Attendance {
        return a.attendance.cmp(&b.attendance);
    }
    collation_key(field_text(a, field)).cmp(&collation_key(field_text(b, field)))
}

/// Stable sort of the filtered subsequence. `Desc` reverses the asc
/// comparator result rather than running an independent comparator, so ties
/// behave identically in both directions.
pub fn sort<'a>(
    records: &[&'a StudentRecord],
    field: SortField,
    direction: SortDirection,
) -> Vec<&'a StudentRecord> {
    let mut out = records.to_vec();
    out.sort_by(|a, b| {
        let ord = compare_asc(a, b, field);
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
    out
}

/// One page of the sorted roster plus the figures the UI needs to draw the
/// pager. An out-of-range page is corrected to page 1 on recomputation; the
/// corrected value is what `page` reports.
#[derive(Debug)]
pub struct PageWindow<'a> {
    pub rows: Vec<&'a StudentRecord>,
    pub page: usize,
    pub page_count: usize,
    pub total: usize,
}

pub const DEFAULT_PAGE_SIZE: usize = 15;

pub fn paginate<'a>(records: &[&'a StudentRecord], page: usize, page_size: usize) -> PageWindow<'a> {
    let total = records.len();
    let page_size = page_size.max(1);
    let mut page = page.max(1);

    let mut start = (page - 1) * page_size;
    if start >= total && page > 1 {
        page = 1;
        start = 0;
    }
    let end = (start + page_size).min(total);

    PageWindow {
        rows: records[start.min(total)..end].to_vec(),
        page,
        page_count: total.div_ceil(page_size).max(1),
        total,
    }
}
