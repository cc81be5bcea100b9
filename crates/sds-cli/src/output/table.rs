use sds_core::height::basic_row_height;
use sds_core::mode::Mode;
use sds_core::record::MsdsRecord;
use std::collections::BTreeMap;

pub fn print(record: &MsdsRecord, mode: Mode) {
    println!("=== Hazard identification ===\n");
    println!("  Signal word: {}", or_dash(&record.signal_word));
    print_list("Classification", &record.hazard_cls);
    print_list("H codes", &record.h_codes);
    print_list("P prevention", &record.p_prev);
    print_list("P response", &record.p_resp);
    print_list("P storage", &record.p_stor);
    print_list("P disposal", &record.p_disp);

    println!("\n=== Composition ===\n");
    if record.composition_data.is_empty() {
        println!("  (no entries)");
    } else {
        for entry in &record.composition_data {
            println!(
                "  {:<14} {}",
                or_dash(&entry.cas),
                or_dash(&entry.concentration)
            );
        }
    }

    print_map("Sections 4-7", &record.sec4_to_7, mode);
    print_map("Section 8 (exposure)", &record.sec8, mode);
    print_map("Section 9 (physical/chemical)", &record.sec9, mode);

    println!("\n=== Section 14 (transport) ===\n");
    println!("  UN number:        {}", or_dash(&record.sec14.un_number));
    println!("  Shipping name:    {}", or_dash(&record.sec14.shipping_name));
    println!("  Hazard class:     {}", or_dash(&record.sec14.hazard_class));
    println!("  Packing group:    {}", or_dash(&record.sec14.packing_group));
    println!("  Marine pollutant: {}", or_dash(&record.sec14.marine_pollutant));

    print_map("Section 15 (regulatory)", &record.sec15, mode);
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

fn print_list(label: &str, items: &[String]) {
    if items.is_empty() {
        println!("  {label}: -");
    } else {
        println!("  {label}: {}", items.join(", "));
    }
}

fn print_map(title: &str, map: &BTreeMap<String, String>, mode: Mode) {
    println!("\n=== {title} ===\n");
    if map.is_empty() {
        println!("  (empty)");
        return;
    }
    for (key, value) in map {
        let mut lines = value.split('\n');
        let first = lines.next().unwrap_or("");
        // Row height hints the spreadsheet template sizing downstream.
        println!(
            "  {key:<6} [{:>5.1}] {}",
            basic_row_height(value, mode),
            or_dash(first)
        );
        for continuation in lines {
            println!("                 {continuation}");
        }
    }
}
