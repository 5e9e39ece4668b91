use cachebench::StorageType;

/// Fill, hatch and edge color of a box or bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxStyle {
    pub color: &'static str,
    pub hatch: &'static str,
    pub edge_color: &'static str,
}

impl BoxStyle {
    const fn new(
        color: &'static str,
        hatch: &'static str,
        edge_color: &'static str,
    ) -> Self {
        Self {
            color,
            hatch,
            edge_color,
        }
    }
}

const LIGHT: BoxStyle = BoxStyle::new("lightgrey", "", "black");
const MEDIUM: BoxStyle = BoxStyle::new("darkgrey", "///", "black");
const DARK: BoxStyle = BoxStyle::new("black", "xxx", "white");

/// Color, line style, marker and marker size of a line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: &'static str,
    pub linestyle: &'static str,
    pub marker: &'static str,
    pub markersize: f64,
}

const OPERATION_LINES: [LineStyle; 6] = [
    LineStyle {
        color: "black",
        linestyle: "-",
        marker: "o",
        markersize: 12.0,
    },
    LineStyle {
        color: "#2d2d2d",
        linestyle: "--",
        marker: "s",
        markersize: 11.0,
    },
    LineStyle {
        color: "#4d4d4d",
        linestyle: "-.",
        marker: "^",
        markersize: 12.0,
    },
    LineStyle {
        color: "#6d6d6d",
        linestyle: ":",
        marker: "D",
        markersize: 10.0,
    },
    LineStyle {
        color: "#8d8d8d",
        linestyle: "-",
        marker: "v",
        markersize: 12.0,
    },
    LineStyle {
        color: "#adadad",
        linestyle: "--",
        marker: "p",
        markersize: 12.0,
    },
];

const SCALABILITY_LINES: [LineStyle; 3] = [
    LineStyle {
        color: "dimgray",
        linestyle: "-",
        marker: "o",
        markersize: 10.0,
    },
    LineStyle {
        color: "gray",
        linestyle: "--",
        marker: "s",
        markersize: 10.0,
    },
    LineStyle {
        color: "darkgray",
        linestyle: "-.",
        marker: "^",
        markersize: 10.0,
    },
];

pub struct PlotFmt;

impl PlotFmt {
    /// Tick label of a policy variant; unknown variants are shown as they
    /// are.
    pub fn policy_variant_name(variant: &str) -> &str {
        match variant {
            "A2Q_default" => "2Q",
            "A2Q_relaxed" => "2Q\n(Non-strict)",
            "A2Q_a2q_ghost_q_enabled" => "A2Q",
            "A2Q_a2q_ghost_q_enabled_and_relaxed" => "A2Q\n(Non-strict)",
            "CLOCK_default" => "CLOCK",
            "CLOCK_relaxed" => "CLOCK\n(Non-strict)",
            "CLOCK_clock_buffer_enabled" => "CLOCK\n(Buffered)",
            "CLOCK_clock_buffer_enabled_and_relaxed" => {
                "CLOCK\n(Buffered+\nNon-strict)"
            }
            "LRU_default" => "LRU",
            "LRU_relaxed" => "LRU\n(Non-strict)",
            "LRU_lru_metadata_update_in_order" => "LRU\n(Ordered)",
            "LRU_lru_metadata_update_in_order_and_relaxed" => {
                "LRU\n(Ordered+\nNon-strict)"
            }
            "device_aware" => "Device\nAware",
            variant => variant,
        }
    }

    /// Single-line version of [`PlotFmt::policy_variant_name`], used in
    /// exported tables.
    pub fn policy_variant_label(variant: &str) -> String {
        Self::policy_variant_name(variant)
            .replace("+\n", "+")
            .replace('\n', " ")
    }

    /// Legend label of a variant in the form `POLICY (Config)`.
    pub fn policy_config_label(variant: &str) -> String {
        match variant.split_once('_') {
            Some((policy, config)) => {
                format!("{} ({})", policy, Self::config_name(config))
            }
            None => variant.to_string(),
        }
    }

    pub fn config_name(config: &str) -> &str {
        match config {
            "lru_metadata_update_in_order_and_relaxed" => "Ordered+Non-strict",
            "lru_metadata_update_in_order" => "Ordered",
            "relaxed" => "Non-strict",
            "default" => "Default",
            config => config,
        }
    }

    pub fn storage_name(storage_type: &StorageType) -> &str {
        match storage_type {
            StorageType::VolatileStorage => "NVDIMM",
            StorageType::PMemStorage => "NVM",
            StorageType::FileStorage => "SSD NVMe",
            StorageType::Other(name) => name,
        }
    }

    pub fn storage_short_name(storage_type: &StorageType) -> &str {
        match storage_type {
            StorageType::FileStorage => "SSD",
            storage_type => Self::storage_name(storage_type),
        }
    }

    pub fn workload_name(workload: &str) -> String {
        let name = match workload {
            "ycsb_a" => "YCSB-A (50% Read, 50% Update)",
            "ycsb_b" => "YCSB-B (95% Read, 5% Update)",
            "ycsb_c" => "YCSB-C (100% Read)",
            "ycsb_d" => "YCSB-D (95% Read, 5% Insert)",
            "ycsb_e" => "YCSB-E (95% Scan, 5% Insert)",
            "ycsb_f" => "YCSB-F (50% Read, 50% RMW)",
            workload => return workload.to_uppercase(),
        };
        name.to_string()
    }

    /// Legend label of an operation, e.g. `Search (zipfian)`.
    pub fn operation_name(operation: &str) -> String {
        match operation {
            "delete" => String::from("Delete"),
            "insert" => String::from("Insert"),
            operation => match operation.strip_prefix("search_") {
                Some(kind) => format!("Search ({})", kind),
                None => capitalize(operation),
            },
        }
    }

    /// Axis label of an operation, e.g. `Search\n(Zipfian)`.
    pub fn operation_axis_name(operation: &str) -> String {
        match operation.strip_prefix("search_") {
            Some(kind) => format!("Search\n({})", capitalize(kind)),
            None => capitalize(operation),
        }
    }

    pub fn thread_label(thread_count: usize) -> String {
        if thread_count == 1 {
            String::from("1 Thread")
        } else {
            format!("{} Threads", thread_count)
        }
    }

    pub fn storage_style(storage_type: &StorageType) -> BoxStyle {
        match storage_type {
            StorageType::VolatileStorage => LIGHT,
            StorageType::PMemStorage => MEDIUM,
            StorageType::FileStorage => DARK,
            StorageType::Other(_) => BoxStyle::new("white", "..", "black"),
        }
    }

    /// Style of the thread-count boxes; positions follow the sorted thread
    /// counts (1, 4 and 8 threads in the experiments).
    pub fn thread_style(index: usize) -> BoxStyle {
        [LIGHT, MEDIUM, DARK][index % 3]
    }

    /// Styles of the V1-1T, V2-1T, V1-4T and V2-4T boxes.
    pub fn version_style(index: usize) -> BoxStyle {
        const STYLES: [BoxStyle; 4] = [
            BoxStyle::new("lightgrey", "", "black"),
            BoxStyle::new("darkgrey", "", "black"),
            BoxStyle::new("lightgrey", "///", "black"),
            BoxStyle::new("black", "///", "white"),
        ];
        STYLES[index % STYLES.len()]
    }

    pub fn operation_line(index: usize) -> LineStyle {
        OPERATION_LINES[index % OPERATION_LINES.len()]
    }

    pub fn scalability_line(index: usize) -> LineStyle {
        SCALABILITY_LINES[index % SCALABILITY_LINES.len()]
    }

    /// Hollow symbol matching a marker, used in text boxes.
    pub fn marker_symbol(marker: &str) -> &str {
        match marker {
            "o" => "○",
            "s" => "□",
            "^" => "△",
            marker => marker,
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_variant_names() {
        assert_eq!(PlotFmt::policy_variant_name("A2Q_default"), "2Q");
        assert_eq!(
            PlotFmt::policy_variant_name("LRU_lru_metadata_update_in_order"),
            "LRU\n(Ordered)"
        );
        assert_eq!(
            PlotFmt::policy_variant_name("device_aware"),
            "Device\nAware"
        );
        // unknown variants are kept
        assert_eq!(
            PlotFmt::policy_variant_name("FIFO_default"),
            "FIFO_default"
        );

        assert_eq!(
            PlotFmt::policy_variant_label("CLOCK_clock_buffer_enabled_and_relaxed"),
            "CLOCK (Buffered+Non-strict)"
        );
        assert_eq!(
            PlotFmt::policy_variant_label("A2Q_relaxed"),
            "2Q (Non-strict)"
        );
    }

    #[test]
    fn config_labels() {
        assert_eq!(
            PlotFmt::policy_config_label(
                "LRU_lru_metadata_update_in_order_and_relaxed"
            ),
            "LRU (Ordered+Non-strict)"
        );
        assert_eq!(
            PlotFmt::policy_config_label("LRU_default"),
            "LRU (Default)"
        );
        assert_eq!(PlotFmt::policy_config_label("LRU"), "LRU");
    }

    #[test]
    fn storage_names() {
        assert_eq!(
            PlotFmt::storage_name(&StorageType::VolatileStorage),
            "NVDIMM"
        );
        assert_eq!(
            PlotFmt::storage_name(&StorageType::FileStorage),
            "SSD NVMe"
        );
        assert_eq!(
            PlotFmt::storage_short_name(&StorageType::FileStorage),
            "SSD"
        );
        assert_eq!(
            PlotFmt::storage_short_name(&StorageType::PMemStorage),
            "NVM"
        );
    }

    #[test]
    fn workload_and_operation_names() {
        assert_eq!(PlotFmt::workload_name("ycsb_c"), "YCSB-C (100% Read)");
        assert_eq!(PlotFmt::workload_name("ycsb_x"), "YCSB_X");

        assert_eq!(PlotFmt::operation_name("insert"), "Insert");
        assert_eq!(
            PlotFmt::operation_name("search_zipfian"),
            "Search (zipfian)"
        );
        assert_eq!(PlotFmt::operation_name("scan"), "Scan");
        assert_eq!(
            PlotFmt::operation_axis_name("search_uniform"),
            "Search\n(Uniform)"
        );
        assert_eq!(PlotFmt::operation_axis_name("delete"), "Delete");
    }

    #[test]
    fn styles() {
        let file = PlotFmt::storage_style(&StorageType::FileStorage);
        assert_eq!(file.hatch, "xxx");
        assert_eq!(file.edge_color, "white");
        assert_eq!(
            PlotFmt::thread_style(0),
            PlotFmt::storage_style(&StorageType::VolatileStorage)
        );
        assert_eq!(PlotFmt::version_style(3).color, "black");
        assert_eq!(PlotFmt::operation_line(6), PlotFmt::operation_line(0));
        assert_eq!(PlotFmt::marker_symbol("s"), "□");
        assert_eq!(PlotFmt::thread_label(1), "1 Thread");
        assert_eq!(PlotFmt::thread_label(8), "8 Threads");
    }
}
