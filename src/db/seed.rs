// ==========================================
// Foundry QC Tracker - reference data seeding
// ==========================================
// Inserts lookup rows that are missing; existing rows are left alone.
// Safe to run on every startup.
// ==========================================

use rusqlite::{params, Connection};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub furnaces: usize,
    pub machines: usize,
    pub defect_types: usize,
    pub decision_types: usize,
    pub element_specifications: usize,
    pub mechanical_rules: usize,
    pub shifts: usize,
    pub engineers: usize,
}

impl SeedReport {
    pub fn total(&self) -> usize {
        self.furnaces
            + self.machines
            + self.defect_types
            + self.decision_types
            + self.element_specifications
            + self.mechanical_rules
            + self.shifts
            + self.engineers
    }
}

const FURNACES: &[&str] = &["A1", "A2", "B1", "B2"];

/// (machine_code, stage)
const MACHINES: &[(&str, &str)] = &[
    ("M10", "Melting"),
    ("M11", "Melting"),
    ("M12", "Melting"),
    ("M100", "Melting"),
    ("AF1", "CCM"),
    ("ZC2", "CCM"),
    ("ZC3", "CCM"),
    ("ZC1", "Annealing"),
    ("CH2", "Annealing"),
    ("CH3", "Annealing"),
    ("CH1", "Zinc"),
    ("HT2", "Zinc"),
    ("HT3", "Zinc"),
    ("HT1", "Cutting"),
    ("CL2", "Cutting"),
    ("CL3", "Cutting"),
    ("CL1", "Hydrotest"),
    ("BC2", "Hydrotest"),
    ("BC3", "Hydrotest"),
    ("BC1", "Coating"),
];

/// (name_ar, name_en, applies_to)
const DEFECT_TYPES: &[(&str, &str, &[&str])] = &[
    ("Out of specification", "Out of specification", &["all"]),
    ("رمال", "Sand", &["Melting", "CCM", "Annealing"]),
    ("نقل معدن/بقايا", "Metal transfer/residue", &["Melting", "CCM"]),
    ("على معدن", "On metal", &["Cutting"]),
    ("خروج", "Exit/Out", &["Lab"]),
    ("حر", "Free/Hot", &["CCM"]),
    ("تريول LA", "LA Drip", &["CCM"]),
    ("سمك على", "Thickness over", &["CCM"]),
    ("سمك ضعيف", "Thickness low", &["CCM"]),
    ("خرافيت", "Graphite", &["Lab"]),
    ("SL خط/يسيت", "SL Line", &["CCM"]),
    ("تطويز", "Deformation", &["CCM"]),
    ("كسر في الراس", "Head break", &["Cutting"]),
    ("فوق سمك", "Over thickness", &["CCM"]),
    ("D4", "D4", &["CCM"]),
    ("Short pipe", "Short pipe", &["Cutting"]),
    ("تحليل قطعة", "Piece analysis", &["Lab"]),
    ("بهيدري", "Byhydri", &["all"]),
    ("فرن CU", "CU Furnace", &["Melting"]),
    ("عيب منزلة", "Grade defect", &["all"]),
    ("Other", "Other", &["all"]),
];

/// (code, name_ar, name_en, color)
const DECISION_TYPES: &[(&str, &str, &str, &str)] = &[
    ("ACCEPT", "قبول", "Accept", "#90EE90"),
    ("REJECT", "رفض", "Reject", "#FF6B6B"),
    ("HOLD", "انتظار", "Hold", "#FFD93D"),
    ("INSPECT_FIRST_LAST", "فحص أول وآخر", "Inspect 1st and Last", "#87CEEB"),
    ("INSPECT_100", "فحص 100%", "Inspect 100%", "#87CEEB"),
    ("DOWNGRADE", "تخفيض", "DownGrade", "#FFA500"),
    ("REHEAT_TREATMENT", "إعادة معالجة", "Reheat Treatment", "#DDA0DD"),
    ("REWORK", "إعادة تشغيل", "Rework", "#DDA0DD"),
];

/// (code, name, min, max)
const ELEMENT_SPECIFICATIONS: &[(&str, &str, Option<f64>, Option<f64>)] = &[
    ("C", "Carbon", Some(3.0), Some(3.9)),
    ("Si", "Silicon", Some(1.86), Some(2.7)),
    ("Mg", "Magnesium", Some(0.031), Some(0.07)),
    ("Cu", "Copper", None, Some(0.1)),
    ("Cr", "Chromium", None, Some(0.1)),
    ("S", "Sulfur", None, Some(0.02)),
    ("Mn", "Manganese", None, Some(0.4)),
    ("P", "Phosphorus", None, Some(0.059)),
    ("Pb", "Lead", None, Some(0.003)),
    ("Al", "Aluminum", None, Some(0.049)),
    ("CE", "Carbon Equivalent", Some(3.62), Some(4.83)),
    ("MnE", "Manganese Equivalent", Some(0.1), Some(0.85)),
    ("MgE", "Magnesium Equivalent", Some(0.023), None),
];

/// (property, name, name_ar, unit)
const MECHANICAL_PROPERTIES: &[(&str, &str, &str, &str)] = &[
    ("tensile_strength", "Tensile strength", "مقاومة الشد", "kgf/mm2"),
    ("elongation", "Elongation", "الاستطالة", "%"),
    ("nodularity_percent", "Nodularity", "نسبة التكور", "%"),
    ("nodule_count", "Nodule count", "عدد العقد", "/mm2"),
    ("hardness", "Hardness", "الصلادة", "HB"),
    ("carbides", "Carbides", "الكربيدات", "%"),
];

/// (property, min, max, decision); min inclusive, max exclusive
const MECHANICAL_RULES: &[(&str, Option<f64>, Option<f64>, &str)] = &[
    ("tensile_strength", Some(42.0), None, "ACCEPT"),
    ("tensile_strength", Some(40.0), Some(42.0), "INSPECT_FIRST_LAST"),
    ("tensile_strength", Some(38.0), Some(40.0), "INSPECT_100"),
    ("tensile_strength", None, Some(38.0), "REJECT"),
    ("elongation", Some(10.0), None, "ACCEPT"),
    ("elongation", Some(8.0), Some(10.0), "INSPECT_FIRST_LAST"),
    ("elongation", Some(6.0), Some(8.0), "INSPECT_100"),
    ("elongation", None, Some(6.0), "REJECT"),
    ("nodularity_percent", Some(70.0), None, "ACCEPT"),
    ("nodularity_percent", Some(60.0), Some(70.0), "INSPECT_FIRST_LAST"),
    ("nodularity_percent", Some(50.0), Some(60.0), "INSPECT_100"),
    ("nodularity_percent", None, Some(50.0), "REJECT"),
    ("nodule_count", Some(100.0), None, "ACCEPT"),
    ("nodule_count", Some(80.0), Some(100.0), "INSPECT_FIRST_LAST"),
    ("nodule_count", Some(60.0), Some(80.0), "INSPECT_100"),
    ("nodule_count", None, Some(60.0), "REJECT"),
    ("hardness", None, Some(230.0), "ACCEPT"),
    ("hardness", Some(230.0), Some(250.0), "INSPECT_FIRST_LAST"),
    ("hardness", Some(250.0), Some(270.0), "INSPECT_100"),
    ("hardness", Some(270.0), None, "REJECT"),
    ("carbides", None, Some(1.0), "ACCEPT"),
    ("carbides", Some(1.0), Some(3.0), "INSPECT_FIRST_LAST"),
    ("carbides", Some(3.0), Some(5.0), "INSPECT_100"),
    ("carbides", Some(5.0), None, "REJECT"),
];

/// (number, name, start, end)
const SHIFTS: &[(i32, &str, &str, &str)] = &[
    (1, "Morning", "06:00", "14:00"),
    (2, "Afternoon", "14:00", "22:00"),
    (3, "Night", "22:00", "06:00"),
];

/// (name, name_ar, role)
const ENGINEERS: &[(&str, &str, &str)] = &[
    ("Hamada Fawzy", "حمادة فوزي", "Shift Engineer"),
    ("Mahmoud Hamdy", "محمود حمدي", "Lab Technician"),
];

/// Seed every reference table in one transaction
pub fn seed_reference_data(conn: &Connection) -> rusqlite::Result<SeedReport> {
    let tx = conn.unchecked_transaction()?;
    let mut report = SeedReport::default();

    for code in FURNACES {
        report.furnaces += tx.execute(
            "INSERT OR IGNORE INTO furnaces (furnace_code, furnace_name) VALUES (?1, ?2)",
            params![code, format!("Furnace {}", code)],
        )?;
    }

    for (code, stage) in MACHINES {
        report.machines += tx.execute(
            "INSERT OR IGNORE INTO machines (machine_code, stage) VALUES (?1, ?2)",
            params![code, stage],
        )?;
    }

    for (name_ar, name_en, applies_to) in DEFECT_TYPES {
        let applies_json = serde_json::to_string(applies_to)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        report.defect_types += tx.execute(
            "INSERT INTO defect_types (defect_name_ar, defect_name_en, applies_to_stages)
             SELECT ?1, ?2, ?3
             WHERE NOT EXISTS (SELECT 1 FROM defect_types WHERE defect_name_en = ?2)",
            params![name_ar, name_en, applies_json],
        )?;
    }

    for (code, name_ar, name_en, color) in DECISION_TYPES {
        report.decision_types += tx.execute(
            "INSERT OR IGNORE INTO decision_types
                (decision_code, decision_name_ar, decision_name_en, color_code)
             VALUES (?1, ?2, ?3, ?4)",
            params![code, name_ar, name_en, color],
        )?;
    }

    for (code, name, min, max) in ELEMENT_SPECIFICATIONS {
        report.element_specifications += tx.execute(
            "INSERT OR IGNORE INTO element_specifications
                (element_code, element_name, min_value, max_value)
             VALUES (?1, ?2, ?3, ?4)",
            params![code, name, min, max],
        )?;
    }

    for (property, min, max, decision) in MECHANICAL_RULES {
        let (name, name_ar, unit) = MECHANICAL_PROPERTIES
            .iter()
            .find(|(code, ..)| code == property)
            .map(|(_, name, name_ar, unit)| (*name, *name_ar, *unit))
            .unwrap_or((*property, *property, ""));
        report.mechanical_rules += tx.execute(
            "INSERT OR IGNORE INTO mechanical_rules
                (property_code, property_name, property_name_ar, unit, min_value, max_value, decision_code)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![property, name, name_ar, unit, min, max, decision],
        )?;
    }

    for (number, name, start, end) in SHIFTS {
        report.shifts += tx.execute(
            "INSERT OR IGNORE INTO shifts (shift_number, shift_name, start_time, end_time)
             VALUES (?1, ?2, ?3, ?4)",
            params![number, name, start, end],
        )?;
    }

    for (name, name_ar, role) in ENGINEERS {
        report.engineers += tx.execute(
            "INSERT INTO engineers (name, name_ar, role)
             SELECT ?1, ?2, ?3
             WHERE NOT EXISTS (SELECT 1 FROM engineers WHERE name = ?1)",
            params![name, name_ar, role],
        )?;
    }

    tx.commit()?;
    Ok(report)
}
