use phf::{Map, Set, phf_map, phf_set};

static ATOMIC_MASSES: Map<&'static str, f64> = phf_map! {
    "H" => 1.0079, "HE" => 4.0026, "LI" => 6.941, "BE" => 9.0122, "B" => 10.811, "C" => 12.0107,
    "N" => 14.0067, "O" => 15.9994, "F" => 18.9984, "NE" => 20.1797, "NA" => 22.9897,
    "MG" => 24.305, "AL" => 26.9815, "SI" => 28.0855, "P" => 30.9738, "S" => 32.065,
    "CL" => 35.453, "K" => 39.0983, "AR" => 39.948, "CA" => 40.078, "SC" => 44.9559,
    "TI" => 47.867, "V" => 50.9415, "CR" => 51.9961, "MN" => 54.938, "FE" => 55.845,
    "NI" => 58.6934, "CO" => 58.9332, "CU" => 63.546, "ZN" => 65.39, "GA" => 69.723,
    "GE" => 72.64, "AS" => 74.9216, "SE" => 78.96, "BR" => 79.904, "KR" => 83.8,
    "RB" => 85.4678, "SR" => 87.62, "Y" => 88.9059, "ZR" => 91.224, "NB" => 92.9064,
    "MO" => 95.94, "TC" => 98.0, "RU" => 101.07, "RH" => 102.9055, "PD" => 106.42,
    "AG" => 107.8682, "CD" => 112.411, "IN" => 114.818, "SN" => 118.71, "SB" => 121.76,
    "I" => 126.9045, "TE" => 127.6, "XE" => 131.293, "CS" => 132.9055, "BA" => 137.327,
    "LA" => 138.9055, "CE" => 140.116, "PR" => 140.9077, "ND" => 144.24, "PM" => 145.0,
    "SM" => 150.36, "EU" => 151.964, "GD" => 157.25, "TB" => 158.9253, "DY" => 162.5,
    "HO" => 164.9303, "ER" => 167.259, "TM" => 168.9342, "YB" => 173.04, "LU" => 174.967,
    "HF" => 178.49, "TA" => 180.9479, "W" => 183.84, "RE" => 186.207, "OS" => 190.23,
    "IR" => 192.217, "PT" => 195.078, "AU" => 196.9665, "HG" => 200.59, "TL" => 204.3833,
    "PB" => 207.2, "BI" => 208.9804, "PO" => 209.0, "AT" => 210.0, "RN" => 222.0, "FR" => 223.0,
    "RA" => 226.0, "AC" => 227.0, "PA" => 231.0359, "TH" => 232.0381, "NP" => 237.0,
    "U" => 238.0289, "AM" => 243.0, "PU" => 244.0, "CM" => 247.0, "BK" => 247.0, "CF" => 251.0,
    "ES" => 252.0, "FM" => 257.0, "MD" => 258.0, "NO" => 259.0, "RF" => 261.0, "LR" => 262.0,
    "DB" => 262.0, "BH" => 264.0, "SG" => 266.0, "MT" => 268.0, "RG" => 272.0, "HS" => 277.0,
};

static COVALENT_RADII: Map<&'static str, f64> = phf_map! {
    "H" => 0.31, "HE" => 0.28, "LI" => 1.28, "BE" => 0.96, "B" => 0.85, "C" => 0.76,
    "N" => 0.71, "O" => 0.66, "F" => 0.57, "NE" => 0.58, "NA" => 1.66, "MG" => 1.41,
    "AL" => 1.21, "SI" => 1.11, "P" => 1.07, "S" => 1.05, "CL" => 1.02, "AR" => 1.06,
    "K" => 2.03, "CA" => 1.76, "SC" => 1.7, "TI" => 1.6, "V" => 1.53, "CR" => 1.39,
    "MN" => 1.39, "FE" => 1.32, "CO" => 1.26, "NI" => 1.24, "CU" => 1.32, "ZN" => 1.22,
    "GA" => 1.22, "GE" => 1.2, "AS" => 1.19, "SE" => 1.2, "BR" => 1.2, "KR" => 1.16,
    "RB" => 2.2, "SR" => 1.95, "Y" => 1.9, "ZR" => 1.75, "NB" => 1.64, "MO" => 1.54,
    "TC" => 1.47, "RU" => 1.46, "RH" => 1.42, "PD" => 1.39, "AG" => 1.45, "CD" => 1.44,
    "IN" => 1.42, "SN" => 1.39, "SB" => 1.39, "TE" => 1.38, "I" => 1.39, "XE" => 1.4,
    "CS" => 2.44, "BA" => 2.15, "LA" => 2.07, "CE" => 2.04, "PR" => 2.03, "ND" => 2.01,
    "PM" => 1.99, "SM" => 1.98, "EU" => 1.98, "GD" => 1.96, "TB" => 1.94, "DY" => 1.92,
    "HO" => 1.92, "ER" => 1.89, "TM" => 1.9, "YB" => 1.87, "LU" => 1.87, "HF" => 1.75,
    "TA" => 1.7, "W" => 1.62, "RE" => 1.51, "OS" => 1.44, "IR" => 1.41, "PT" => 1.36,
    "AU" => 1.36, "HG" => 1.32, "TL" => 1.45, "PB" => 1.46, "BI" => 1.48, "PO" => 1.4,
    "AT" => 1.5, "RN" => 1.5, "FR" => 2.6, "RA" => 2.21, "AC" => 2.15, "TH" => 2.06,
    "PA" => 2.0, "U" => 1.96, "NP" => 1.9, "PU" => 1.87, "AM" => 1.8, "CM" => 1.69,
};

static METALS: Set<&'static str> = phf_set! {
    "LI", "BE", "NA", "MG", "AL", "K", "CA", "SC", "TI", "V", "CR", "MN", "FE", "CO", "NI",
    "CU", "ZN", "RB", "SR", "Y", "ZR", "NB", "MO", "TC", "RU", "RH", "PD", "AG", "CD", "IN",
    "SN", "CS", "BA", "LA", "CE", "PR", "ND", "PM", "SM", "EU", "GD", "TB", "DY", "HO", "ER",
    "TM", "YB", "LU", "HF", "TA", "W", "RE", "OS", "IR", "PT", "AU", "HG", "TL", "PB", "BI",
    "PO", "FR", "RA", "AC", "TH", "PA", "U", "NP", "PU", "AM", "CM", "BK", "CF", "ES", "FM",
    "MD", "NO", "LR", "RF", "DB", "SG", "BH", "HS", "MT", "DS", "RG", "CN", "FL", "LV",
};

fn normalized(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}

/// Standard atomic mass in daltons. Unknown symbols weigh nothing.
pub fn atomic_mass(symbol: &str) -> f64 {
    ATOMIC_MASSES
        .get(normalized(symbol).as_str())
        .copied()
        .unwrap_or(0.0)
}

/// Single-bond covalent radius in Ångströms, or `0.0` when the element is unknown.
pub fn covalent_radius(symbol: &str) -> f64 {
    COVALENT_RADII
        .get(normalized(symbol).as_str())
        .copied()
        .unwrap_or(0.0)
}

pub fn is_metal(symbol: &str) -> bool {
    METALS.contains(normalized(symbol).as_str())
}
