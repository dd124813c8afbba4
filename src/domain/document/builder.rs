//! 由 `Report` 构造格式无关的文档树
//!
//! 构造前先做契约检查，变体与报告分类不一致时直接返回错误，不产生任何部分输出。

use log::debug;

use super::{
    Block, Cell, Footer, HeaderBand, InfoItem, ReportDocument, Section, SignatureBox, Table,
    BLANK_DATE, BLANK_SIGNATURE, EQUIPMENT_INFORMATION, HEADER_LABEL, HEADER_SUB_LABEL,
    NOTES_AND_RECOMMENDATIONS, NOT_AVAILABLE, PROJECT_INFORMATION, RESULT_COLUMNS, SIGNATURES,
};
use crate::domain::services::report_validator::ReportValidator;
use crate::models::{
    CableTestData, GroundingTestData, ProtectionRelayTestData, Report, SwitchgearTestData,
    TestData, TestResultEntry, TransformerTestData,
};
use crate::utils::error::AppResult;
use crate::utils::time_utils::format_report_date;

/// 构造报告文档
pub fn build_document(report: &Report) -> AppResult<ReportDocument> {
    ReportValidator::validate_report(report)?;

    let mut sections = vec![project_section(report), equipment_section(report)];
    sections.push(test_data_section(report));
    if let Some(notes) = notes_section(report) {
        sections.push(notes);
    }
    sections.push(signature_section(report));

    let document = ReportDocument {
        title: format!("T&C Report {}", report.report_number()),
        header: header_band(report),
        sections,
        footer: Footer {
            project_line: format!("T&C Report - {}", report.header.project_name),
            report_number_line: format!("Report No: {}", report.report_number()),
        },
    };

    debug!(
        "报告文档构造完成: {} 章节数={}",
        report.report_number(),
        document.sections.len()
    );
    Ok(document)
}

/// 数值显示：最短往返表示，整数不带小数点
fn num(value: f64) -> String {
    format!("{}", value)
}

fn fixed(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

fn or_na(value: Option<&str>) -> String {
    value.unwrap_or(NOT_AVAILABLE).to_string()
}

fn opt_fixed(value: Option<f64>, decimals: usize) -> Cell {
    Cell::plain(value.map(|v| fixed(v, decimals)).unwrap_or_else(|| NOT_AVAILABLE.to_string()))
}

fn opt_num(value: Option<f64>) -> Cell {
    Cell::plain(value.map(num).unwrap_or_else(|| NOT_AVAILABLE.to_string()))
}

fn header_band(report: &Report) -> HeaderBand {
    HeaderBand {
        label: HEADER_LABEL.to_string(),
        sub_label: HEADER_SUB_LABEL.to_string(),
        title: report.report_type.label().to_string(),
        subtitle: report.header.project_name.clone(),
        report_number: report.report_number().to_string(),
        revision_line: format!("Rev: {}", report.header.revision_number),
        date_line: format!("Date: {}", format_report_date(report.header.report_date)),
    }
}

fn project_section(report: &Report) -> Section {
    let header = &report.header;
    let mut section = Section::new(PROJECT_INFORMATION);
    section.push(Block::InfoGrid {
        items: vec![
            InfoItem::new("Project Name:", header.project_name.clone()),
            InfoItem::new("Project No:", or_na(header.project_number.as_deref())),
            InfoItem::new("Substation:", header.substation_name.clone()),
            InfoItem::new("Voltage Level:", header.voltage_level.label()),
            InfoItem::new("Location:", or_na(header.location.as_deref())),
            InfoItem::new("Test Date:", format_report_date(header.test_date)),
        ],
    });
    section
}

fn equipment_section(report: &Report) -> Section {
    let equipment = &report.equipment;
    let environmental = &report.environmental;
    let mut section = Section::new(EQUIPMENT_INFORMATION);
    section.push(Block::InfoGrid {
        items: vec![
            InfoItem::new("Equipment Tag:", equipment.equipment_tag.clone()),
            InfoItem::new("Type:", equipment.equipment_type.clone()),
            InfoItem::new("Manufacturer:", or_na(equipment.manufacturer.as_deref())),
            InfoItem::new("Model:", or_na(equipment.model.as_deref())),
            InfoItem::new("Serial No:", or_na(equipment.serial_number.as_deref())),
            InfoItem::new(
                "Ambient Temp:",
                environmental
                    .ambient_temp
                    .map(|t| format!("{}°C", num(t)))
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            ),
            InfoItem::new(
                "Humidity:",
                environmental
                    .humidity
                    .map(|h| format!("{}%", num(h)))
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            ),
        ],
    });
    section
}

fn test_data_section(report: &Report) -> Section {
    let mut section = Section::new(report.report_type.section_title());
    match &report.test_data {
        TestData::ProtectionRelay(data) => protection_relay_blocks(&mut section, data),
        TestData::Transformer(data) => transformer_blocks(&mut section, data),
        TestData::Switchgear(data) => switchgear_blocks(&mut section, data),
        TestData::Cable(data) => cable_blocks(&mut section, data),
        TestData::Grounding(data) => grounding_blocks(&mut section, data),
    }
    section.push(Block::caption("Test Results"));
    section.push(Block::Table(results_table(report.test_data.test_results())));
    section
}

/// 通用结果表
pub fn results_table(results: &[TestResultEntry]) -> Table {
    let mut table = Table::new(&RESULT_COLUMNS);
    for entry in results {
        table.push_row(vec![
            Cell::plain(entry.test_name.clone()),
            Cell::plain(num(entry.setting_value)),
            Cell::plain(num(entry.measured_value)),
            Cell::plain(entry.unit.clone()),
            Cell::plain(num(entry.tolerance)),
            Cell::plain(num(entry.deviation)),
            Cell::bold(entry.result.to_string()),
        ]);
    }
    table
}

fn protection_relay_blocks(section: &mut Section, data: &ProtectionRelayTestData) {
    let mut items = vec![
        InfoItem::new("Relay Type:", data.relay_type.to_string()),
        InfoItem::new("Manufacturer:", data.manufacturer.clone()),
        InfoItem::new("Model:", data.model.clone()),
        InfoItem::new("CT Ratio:", data.ct_ratio.clone()),
    ];
    if let Some(pt) = &data.pt_ratio {
        items.push(InfoItem::new("PT Ratio:", pt.clone()));
    }
    section.push(Block::InfoGrid { items });

    if let Some(oc) = &data.overcurrent {
        section.push(Block::caption("Overcurrent Settings"));
        let mut table = Table::new(&[
            ("Element", 20),
            ("Pickup (A)", 20),
            ("Time Dial", 15),
            ("Curve", 25),
            ("Trip Time (s)", 20),
        ]);
        for (name, element) in [("Phase", &oc.phase), ("Earth", &oc.earth)] {
            table.push_row(vec![
                Cell::plain(name),
                Cell::plain(num(element.pickup)),
                Cell::plain(num(element.time_dial)),
                Cell::plain(element.curve.label()),
                Cell::plain(num(element.trip_time)),
            ]);
        }
        section.push(Block::Table(table));
        if let Some(inst) = &oc.instantaneous {
            section.push(Block::note(format!(
                "Instantaneous: pickup {} A, operating time {} ms",
                num(inst.pickup),
                num(inst.operating_time)
            )));
        }
    }

    if let Some(diff) = &data.differential {
        section.push(Block::caption("Differential Settings"));
        let mut table = Table::new(&[
            ("Operate Point (%In)", 34),
            ("Restraint Slope (%)", 33),
            ("High Set (%In)", 33),
        ]);
        table.push_row(vec![
            Cell::plain(num(diff.operate_point)),
            Cell::plain(num(diff.restraint_slope)),
            Cell::plain(num(diff.high_set_point)),
        ]);
        section.push(Block::Table(table));
    }
}

fn transformer_blocks(section: &mut Section, data: &TransformerTestData) {
    let rating = &data.rating;
    section.push(Block::InfoGrid {
        items: vec![
            InfoItem::new("Type:", data.transformer_type.to_string()),
            InfoItem::new("Rating:", format!("{} MVA", num(rating.mva))),
            InfoItem::new("Primary Voltage:", format!("{} kV", num(rating.primary_kv))),
            InfoItem::new("Secondary Voltage:", format!("{} kV", num(rating.secondary_kv))),
            InfoItem::new("Frequency:", format!("{} Hz", rating.frequency)),
            InfoItem::new("Cooling:", rating.cooling_type.clone()),
        ],
    });

    let winding = &data.winding_resistance;
    section.push(Block::caption(format!(
        "Winding Resistance (mOhm) @ {}°C",
        num(winding.temperature)
    )));
    let mut table = Table::even(&["Winding", "R-Y", "Y-B", "B-R"]);
    for (name, phases) in [("HV", &winding.hv_phases), ("LV", &winding.lv_phases)] {
        let mut row = vec![Cell::plain(name)];
        row.extend(phases.values().iter().map(|v| Cell::plain(fixed(*v, 3))));
        table.push_row(row);
    }
    section.push(Block::Table(table));

    let ratio = &data.turns_ratio;
    section.push(Block::caption(format!(
        "Turns Ratio - Nominal {}, Tap {}",
        num(ratio.nominal_ratio),
        ratio.tap_position
    )));
    let mut table = Table::new(&[("Phase", 30), ("Measured Ratio", 35), ("Dev %", 35)]);
    for phase in &ratio.phases {
        table.push_row(vec![
            Cell::plain(phase.phase.to_string()),
            Cell::plain(num(phase.measured_ratio)),
            Cell::plain(num(phase.deviation)),
        ]);
    }
    section.push(Block::Table(table));

    let insulation = &data.insulation_resistance;
    section.push(Block::caption(format!(
        "Insulation Resistance (MOhm) @ {}V DC",
        insulation.test_voltage
    )));
    let mut table = Table::even(&["HV-LV", "HV-Earth", "LV-Earth", "PI"]);
    table.push_row(vec![
        Cell::plain(num(insulation.hv_to_lv)),
        Cell::plain(num(insulation.hv_to_earth)),
        Cell::plain(num(insulation.lv_to_earth)),
        Cell::plain(fixed(insulation.polarization_index, 2)),
    ]);
    section.push(Block::Table(table));

    if let Some(oil) = &data.oil_tests {
        section.push(Block::caption("Oil Tests"));
        let mut table = Table::new(&[
            ("Breakdown (kV)", 34),
            ("Moisture (ppm)", 33),
            ("Acidity (mg KOH/g)", 33),
        ]);
        table.push_row(vec![
            Cell::plain(num(oil.breakdown_voltage)),
            Cell::plain(num(oil.moisture_content)),
            Cell::plain(num(oil.acidity_number)),
        ]);
        section.push(Block::Table(table));
    }
}

fn switchgear_blocks(section: &mut Section, data: &SwitchgearTestData) {
    let rating = &data.rating;
    section.push(Block::InfoGrid {
        items: vec![
            InfoItem::new("Breaker Type:", data.breaker_type.label()),
            InfoItem::new("Manufacturer:", data.manufacturer.clone()),
            InfoItem::new("Model:", data.model.clone()),
            InfoItem::new("Rated Voltage:", format!("{} kV", num(rating.rated_voltage))),
            InfoItem::new("Rated Current:", format!("{} A", num(rating.rated_current))),
            InfoItem::new("Breaking Capacity:", format!("{} kA", num(rating.breaking_capacity))),
        ],
    });

    let timing = &data.timing;
    section.push(Block::caption("Circuit Breaker Timing (ms)"));
    let mut table = Table::even(&["Operation", "Phase A", "Phase B", "Phase C"]);
    for (name, values) in [("Close", &timing.close_time), ("Open", &timing.open_time)] {
        let mut row = vec![Cell::plain(name)];
        row.extend(values.values().iter().map(|v| Cell::plain(num(*v))));
        table.push_row(row);
    }
    section.push(Block::Table(table));
    section.push(Block::note(format!("Simultaneity: {} ms", num(timing.simultaneity))));

    let contact = &data.contact_resistance;
    section.push(Block::caption(format!(
        "Contact Resistance (μOhm) - Limit: {}",
        num(contact.acceptable_limit)
    )));
    let mut table = Table::new(&[("Phase A", 33), ("Phase B", 33), ("Phase C", 34)]);
    table.push_row(vec![
        Cell::plain(num(contact.phase_a)),
        Cell::plain(num(contact.phase_b)),
        Cell::plain(num(contact.phase_c)),
    ]);
    section.push(Block::Table(table));

    let insulation = &data.insulation_resistance;
    section.push(Block::caption(format!(
        "Insulation Resistance (MOhm) @ {}V DC",
        insulation.test_voltage
    )));
    let mut table = Table::even(&["Phase-Phase", "Phase-Earth"]);
    table.push_row(vec![
        Cell::plain(num(insulation.phase_to_phase)),
        Cell::plain(num(insulation.phase_to_earth)),
    ]);
    section.push(Block::Table(table));

    if let Some(gas) = &data.sf6_gas {
        section.push(Block::caption("SF6 Gas"));
        let mut table = Table::new(&[("Pressure (bar)", 34), ("Moisture (ppmv)", 33), ("Purity (%)", 33)]);
        table.push_row(vec![
            Cell::plain(num(gas.pressure)),
            Cell::plain(num(gas.moisture_content)),
            Cell::plain(num(gas.purity)),
        ]);
        section.push(Block::Table(table));
    }

    section.push(Block::note(format!(
        "Spring charging time: {} s, motor current: {} A",
        num(data.motor_operation.spring_charging_time),
        num(data.motor_operation.motor_current)
    )));
}

fn cable_blocks(section: &mut Section, data: &CableTestData) {
    section.push(Block::InfoGrid {
        items: vec![
            InfoItem::new("Cable Type:", data.cable_type.clone()),
            InfoItem::new("Length:", format!("{} m", num(data.length))),
            InfoItem::new("Cross Section:", format!("{} mm²", num(data.cross_section))),
            InfoItem::new("Cores:", data.cores.to_string()),
        ],
    });

    let insulation = &data.insulation_resistance;
    section.push(Block::caption(format!(
        "Insulation Resistance (MOhm) @ {}V DC, {}°C",
        insulation.test_voltage,
        num(insulation.temperature)
    )));
    let mut table = Table::new(&[("Core 1-Earth", 33), ("Core 2-Earth", 33), ("Core 3-Earth", 34)]);
    table.push_row(vec![
        Cell::plain(num(insulation.core1_to_earth)),
        opt_num(insulation.core2_to_earth),
        opt_num(insulation.core3_to_earth),
    ]);
    section.push(Block::Table(table));
    let mut corrected = format!("Corrected to 20°C: {} MOhm", num(insulation.corrected_value));
    if let Some(core_to_core) = insulation.core_to_core {
        corrected.push_str(&format!(", core to core: {} MOhm", num(core_to_core)));
    }
    section.push(Block::note(corrected));

    let continuity = &data.continuity;
    section.push(Block::caption("Continuity (Ohm)"));
    let mut table = Table::new(&[("Core 1", 33), ("Core 2", 33), ("Core 3", 34)]);
    table.push_row(vec![
        Cell::plain(fixed(continuity.core1, 3)),
        opt_fixed(continuity.core2, 3),
        opt_fixed(continuity.core3, 3),
    ]);
    section.push(Block::Table(table));

    if let Some(hi_pot) = &data.hi_pot {
        section.push(Block::caption("Hi-Pot Test"));
        let mut table = Table::even(&["Test Voltage (kV DC)", "Duration (min)", "Leakage (μA)", "Result"]);
        table.push_row(vec![
            Cell::plain(num(hi_pot.test_voltage)),
            Cell::plain(num(hi_pot.duration)),
            Cell::plain(num(hi_pot.leakage_current)),
            Cell::bold(hi_pot.result.to_string()),
        ]);
        section.push(Block::Table(table));
    }
}

fn grounding_blocks(section: &mut Section, data: &GroundingTestData) {
    let earth = &data.earth_resistance;
    let mut items = vec![
        InfoItem::new("Grounding System:", data.grounding_system.to_string()),
        InfoItem::new("Test Method:", earth.test_method.to_string()),
        InfoItem::new("Main Earth:", format!("{} Ohm", num(earth.main_earth))),
        InfoItem::new(
            "Soil Resistivity:",
            earth
                .soil_resistivity
                .map(|r| format!("{} Ohm-m", num(r)))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        ),
    ];
    if let Some(neutral) = earth.neutral_earth {
        items.push(InfoItem::new("Neutral Earth:", format!("{} Ohm", num(neutral))));
    }
    if let Some(equipment) = earth.equipment_earth {
        items.push(InfoItem::new("Equipment Earth:", format!("{} Ohm", num(equipment))));
    }
    section.push(Block::InfoGrid { items });

    section.push(Block::caption("Continuity Measurements (mOhm)"));
    let mut table = Table::new(&[("From", 30), ("To", 30), ("Resistance", 20), ("Result", 20)]);
    for m in &data.continuity.measurements {
        table.push_row(vec![
            Cell::plain(m.from_point.clone()),
            Cell::plain(m.to_point.clone()),
            Cell::plain(num(m.resistance)),
            Cell::bold(m.result.to_string()),
        ]);
    }
    section.push(Block::Table(table));
}

fn notes_section(report: &Report) -> Option<Section> {
    let notes = report.notes_text();
    let recommendations = report.recommendations_text();
    if notes.is_none() && recommendations.is_none() {
        return None;
    }

    let mut section = Section::new(NOTES_AND_RECOMMENDATIONS);
    if let Some(text) = notes {
        section.push(Block::Paragraph {
            label: "Notes:".to_string(),
            text: text.to_string(),
        });
    }
    if let Some(text) = recommendations {
        section.push(Block::Paragraph {
            label: "Recommendations:".to_string(),
            text: text.to_string(),
        });
    }
    Some(section)
}

fn signature_section(report: &Report) -> Section {
    let header = &report.header;
    let blank_date = format!("Date: {}", BLANK_DATE);
    let name_or_blank = |name: Option<&str>| {
        name.map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(BLANK_SIGNATURE)
            .to_string()
    };

    let mut section = Section::new(SIGNATURES);
    section.push(Block::Signatures {
        boxes: vec![
            SignatureBox {
                role: "Tested By".to_string(),
                name: header.tested_by.clone(),
                date_line: format!("Date: {}", format_report_date(header.test_date)),
            },
            SignatureBox {
                role: "Reviewed By".to_string(),
                name: name_or_blank(header.reviewed_by.as_deref()),
                date_line: blank_date.clone(),
            },
            SignatureBox {
                role: "Approved By".to_string(),
                name: name_or_blank(header.approved_by.as_deref()),
                date_line: blank_date,
            },
        ],
    });
    section
}
