//! Architecture-agnostic facility definitions, strictly ascending by bit.

use crate::dispatch::OpcodeEntry as Op;
use crate::table::{DependencyRule, FacilityDef};

const N3: &[Op] = &[
    Op::extended(0x01, 0x0B, "TAM"),
    Op::extended(0x01, 0x0C, "SAM24"),
    Op::extended(0x01, 0x0D, "SAM31"),
    Op::extended(0xB9, 0x1F, "LRVR"),
    Op::extended(0xE3, 0x1E, "LRV"),
    Op::extended(0xE3, 0x3E, "STRV"),
];

const DAT_ENHANCE_1: &[Op] = &[
    Op::extended(0xB9, 0x8E, "IDTE"),
    Op::extended(0xB9, 0x8A, "CSPG"),
];

const STFL_EXTENDED: &[Op] = &[Op::extended(0xB2, 0xB0, "STFLE")];

const ENHANCED_DAT_1: &[Op] = &[Op::extended(0xB9, 0xAF, "PFMF")];

const CONFIG_TOPOLOGY: &[Op] = &[Op::extended(0xB9, 0xA2, "PTF")];

const EXTENDED_TRANSL_2: &[Op] = &[
    Op::primary(0xA8, "MVCLE"),
    Op::primary(0xA9, "CLCLE"),
    Op::extended(0xB2, 0xA5, "TRE"),
    Op::extended(0xB2, 0xA6, "CU21"),
    Op::extended(0xB2, 0xA7, "CU12"),
    Op::extended(0xB9, 0x90, "TRTT"),
    Op::extended(0xB9, 0x91, "TRTO"),
    Op::extended(0xB9, 0x92, "TROT"),
    Op::extended(0xB9, 0x93, "TROO"),
];

const MSA: &[Op] = &[
    Op::extended(0xB9, 0x2E, "KM"),
    Op::extended(0xB9, 0x2F, "KMC"),
    Op::extended(0xB9, 0x1E, "KMAC"),
    Op::extended(0xB9, 0x3E, "KIMD"),
    Op::extended(0xB9, 0x3F, "KLMD"),
];

const LONG_DISPL_INST: &[Op] = &[
    Op::extended(0xE3, 0x58, "LY"),
    Op::extended(0xE3, 0x50, "STY"),
    Op::extended(0xE3, 0x5A, "AY"),
    Op::extended(0xE3, 0x5B, "SY"),
];

const HFP_MULT_ADD_SUB: &[Op] = &[
    Op::extended(0xB3, 0x2E, "MAER"),
    Op::extended(0xB3, 0x3E, "MADR"),
    Op::extended(0xB3, 0x2F, "MSER"),
    Op::extended(0xB3, 0x3F, "MSDR"),
];

const EXTENDED_IMMED: &[Op] = &[
    Op::extended(0xC2, 0x09, "AFI"),
    Op::extended(0xC2, 0x08, "AGFI"),
    Op::extended(0xC2, 0x0D, "CFI"),
    Op::extended(0xC0, 0x09, "IILF"),
    Op::extended(0xC0, 0x0B, "NILF"),
    Op::extended(0xB9, 0x26, "LBR"),
    Op::extended(0xB9, 0x83, "FLOGR"),
];

const EXTENDED_TRANSL_3: &[Op] = &[
    Op::extended(0xB9, 0xB0, "CU14"),
    Op::extended(0xB9, 0xB1, "CU24"),
    Op::extended(0xB9, 0xB2, "CU41"),
    Op::extended(0xB9, 0xB3, "CU42"),
    Op::extended(0xB9, 0xBE, "SRSTU"),
    Op::primary(0xD0, "TRTR"),
];

const HFP_UNNORM_EXT: &[Op] = &[
    Op::extended(0xB3, 0x38, "MAYLR"),
    Op::extended(0xB3, 0x3A, "MAYR"),
];

const STORE_CLOCK_FAST: &[Op] = &[Op::extended(0xB2, 0x7C, "STCKF")];

const PARSING_ENHANCE: &[Op] = &[
    Op::extended(0xB9, 0xBF, "TRTE"),
    Op::extended(0xB9, 0xBD, "TRTRE"),
];

const MVCOS: &[Op] = &[Op::extended(0xC8, 0x00, "MVCOS")];

const TOD_CLOCK_STEER: &[Op] = &[Op::extended(0x01, 0x04, "PTFF")];

const EXTRACT_CPU_TIME: &[Op] = &[Op::extended(0xC8, 0x01, "ECTG")];

const CSSF: &[Op] = &[Op::extended(0xC8, 0x02, "CSST")];

const GEN_INST_EXTN: &[Op] = &[
    Op::extended(0xC6, 0x0D, "CRL"),
    Op::extended(0xC6, 0x08, "CGRL"),
    Op::extended(0xC4, 0x05, "LHRL"),
    Op::extended(0xEC, 0x76, "CRJ"),
    Op::extended(0xEC, 0x64, "CGRJ"),
    Op::extended(0xE5, 0x4C, "MVHI"),
    Op::extended(0xEB, 0x6A, "ASI"),
];

const EXECUTE_EXTN: &[Op] = &[Op::extended(0xC6, 0x00, "EXRL")];

const FP_EXTENSION: &[Op] = &[
    Op::extended(0xB3, 0x90, "CELFBR"),
    Op::extended(0xB3, 0x91, "CDLFBR"),
    Op::extended(0xB3, 0x92, "CXLFBR"),
    Op::extended(0xB3, 0x9C, "CLFEBR"),
    Op::extended(0xB3, 0x9D, "CLFDBR"),
    Op::extended(0xB3, 0x9E, "CLFXBR"),
];

const LOAD_PROG_PARAM: &[Op] = &[Op::extended(0xB2, 0x80, "LPP")];

const FPS_ENHANCEMENT: &[Op] = &[
    Op::extended(0xB3, 0xC1, "LDGR"),
    Op::extended(0xB3, 0xCD, "LGDR"),
    Op::extended(0xB3, 0x72, "CPSDR"),
    Op::extended(0xB3, 0x73, "LCDFR"),
    Op::extended(0xB3, 0x70, "LPDFR"),
    Op::extended(0xB3, 0x71, "LNDFR"),
    Op::extended(0xB2, 0xB9, "SRNMT"),
];

const DFP: &[Op] = &[
    Op::extended(0xB3, 0xD0, "MDTR"),
    Op::extended(0xB3, 0xD1, "DDTR"),
    Op::extended(0xB3, 0xD2, "ADTR"),
    Op::extended(0xB3, 0xD3, "SDTR"),
    Op::extended(0xB3, 0xD4, "LDETR"),
    Op::extended(0xB3, 0xD5, "LEDTR"),
    Op::extended(0xB3, 0xE4, "CDTR"),
    Op::extended(0xB3, 0xE3, "CSDTR"),
    Op::extended(0xB3, 0xF3, "CDSTR"),
];

const PFPO: &[Op] = &[Op::extended(0x01, 0x0A, "PFPO")];

const DISTINCT_OPERANDS: &[Op] = &[
    Op::extended(0xB9, 0xF8, "ARK"),
    Op::extended(0xB9, 0xE8, "AGRK"),
    Op::extended(0xB9, 0xF4, "NRK"),
    Op::extended(0xB9, 0xE1, "POPCNT"),
    Op::extended(0xB9, 0xF2, "LOCR"),
    Op::extended(0xEB, 0xF2, "LOC"),
];

const DFP_ZONE_CONV: &[Op] = &[
    Op::extended(0xED, 0xAA, "CDZT"),
    Op::extended(0xED, 0xA8, "CZDT"),
    Op::extended(0xED, 0xAB, "CXZT"),
    Op::extended(0xED, 0xA9, "CZXT"),
];

const EXECUTION_HINT: &[Op] = &[
    Op::primary(0xC7, "BPP"),
    Op::primary(0xC5, "BPRP"),
    Op::extended(0xB2, 0xE8, "PPA"),
    Op::extended(0xE3, 0x9F, "LAT"),
];

const CONSTRAINED_TX: &[Op] = &[Op::extended(0xE5, 0x61, "TBEGINC")];

const MSA_EXTENSION_5: &[Op] = &[Op::extended(0xB9, 0x3C, "PPNO")];

const TRANSACTIONAL_EXEC: &[Op] = &[
    Op::extended(0xE5, 0x60, "TBEGIN"),
    Op::extended(0xB2, 0xF8, "TEND"),
    Op::extended(0xB2, 0xFC, "TABORT"),
    Op::extended(0xB2, 0xEC, "ETND"),
    Op::extended(0xE3, 0x25, "NTSTG"),
];

const MSA_EXTENSION_4: &[Op] = &[
    Op::extended(0xB9, 0x2D, "KMCTR"),
    Op::extended(0xB9, 0x2A, "KMF"),
    Op::extended(0xB9, 0x2B, "KMO"),
    Op::extended(0xB9, 0x2C, "PCC"),
];

const DFP_PACK_CONV: &[Op] = &[
    Op::extended(0xED, 0xAE, "CDPT"),
    Op::extended(0xED, 0xAC, "CPDT"),
    Op::extended(0xED, 0xAF, "CXPT"),
    Op::extended(0xED, 0xAD, "CPXT"),
];

const VECTOR: &[Op] = &[
    Op::extended(0xE7, 0x06, "VL"),
    Op::extended(0xE7, 0x0E, "VST"),
    Op::extended(0xE7, 0xF3, "VA"),
    Op::extended(0xE7, 0xF7, "VS"),
    Op::extended(0xE7, 0x44, "VGBM"),
];

const VECTOR_ENH_1: &[Op] = &[
    Op::extended(0xE7, 0xB8, "VMSL"),
    Op::extended(0xE7, 0x6C, "VNX"),
    Op::extended(0xE7, 0x6E, "VNN"),
    Op::extended(0xE7, 0x6F, "VOC"),
];

const HERC_MOVE_INVERSE: &[Op] = &[Op::primary(0xE8, "MVCIN")];

const HERC_TCPIP_EXTENSION: &[Op] = &[Op::primary(0x75, "TCPIP")];

/// Members of the S/370 instruction extension, in enable order.
///
/// Each "requires" target precedes its dependent so the forward walk enables
/// prerequisites first and the reverse walk disables dependents first.
pub const S370_EXTENSION_MEMBERS: &[u16] = &[16, 24, 22, 30, 21, 34, 35];

/// Canonical facility definitions.
pub const CANONICAL_FACILITIES: &[FacilityDef] = &[
    FacilityDef::new(0, "000_N3", "ESA/390 instructions marked N3 are installed")
        .with_opcodes(N3),
    FacilityDef::new(1, "001_ZARCH_INSTALLED", "z/Architecture architectural mode is installed"),
    FacilityDef::new(2, "002_ZARCH_ACTIVE", "z/Architecture architectural mode is active")
        .with_rule(DependencyRule::requires(&[1])),
    FacilityDef::new(3, "003_DAT_ENHANCE_1", "DAT-Enhancement Facility 1")
        .with_opcodes(DAT_ENHANCE_1),
    FacilityDef::new(
        4,
        "004_IDTE_SC_SEGTAB",
        "IDTE selective clearing when segment-table entry invalidated",
    )
    .with_rule(DependencyRule::requires(&[3])),
    FacilityDef::new(
        5,
        "005_IDTE_SC_REGTAB",
        "IDTE selective clearing when region-table entry invalidated",
    )
    .with_rule(DependencyRule::requires(&[4])),
    FacilityDef::new(6, "006_ASN_LX_REUSE", "ASN-and-LX-Reuse Facility"),
    FacilityDef::new(7, "007_STFL_EXTENDED", "Store-Facility-List-Extended Facility")
        .with_opcodes(STFL_EXTENDED),
    FacilityDef::new(8, "008_ENHANCED_DAT_1", "Enhanced-DAT Facility 1")
        .with_opcodes(ENHANCED_DAT_1),
    FacilityDef::new(9, "009_SENSE_RUN_STATUS", "Sense-Running-Status Facility"),
    FacilityDef::new(10, "010_CONDITIONAL_SSKE", "Conditional-SSKE Facility"),
    FacilityDef::new(11, "011_CONFIG_TOPOLOGY", "Configuration-Topology Facility")
        .with_opcodes(CONFIG_TOPOLOGY),
    FacilityDef::new(13, "013_IPTE_RANGE", "IPTE-Range Facility"),
    FacilityDef::new(14, "014_NONQ_KEY_SETTING", "Nonquiescing Key-Setting Facility"),
    FacilityDef::new(16, "016_EXTENDED_TRANSL_2", "Extended-Translation Facility 2")
        .with_opcodes(EXTENDED_TRANSL_2),
    FacilityDef::new(17, "017_MSA", "Message-Security Assist").with_opcodes(MSA),
    FacilityDef::new(18, "018_LONG_DISPL_INST", "Long-Displacement Facility")
        .with_opcodes(LONG_DISPL_INST),
    FacilityDef::new(19, "019_LONG_DISPL_HPERF", "Long-Displacement Facility Has High Performance")
        .with_rule(DependencyRule::requires(&[18])),
    FacilityDef::new(20, "020_HFP_MULT_ADD_SUB", "HFP-Multiply-and-Add/Subtract Facility")
        .with_opcodes(HFP_MULT_ADD_SUB),
    FacilityDef::new(21, "021_EXTENDED_IMMED", "Extended-Immediate Facility")
        .with_opcodes(EXTENDED_IMMED),
    FacilityDef::new(22, "022_EXTENDED_TRANSL_3", "Extended-Translation Facility 3")
        .with_opcodes(EXTENDED_TRANSL_3),
    FacilityDef::new(23, "023_HFP_UNNORM_EXT", "HFP-Unnormalized-Extensions Facility")
        .with_opcodes(HFP_UNNORM_EXT),
    FacilityDef::new(24, "024_ETF2_ENHANCEMENT", "ETF2-Enhancement Facility")
        .with_rule(DependencyRule::requires(&[16])),
    FacilityDef::new(25, "025_STORE_CLOCK_FAST", "Store-Clock-Fast Facility")
        .with_opcodes(STORE_CLOCK_FAST),
    FacilityDef::new(26, "026_PARSING_ENHANCE", "Parsing-Enhancement Facility")
        .with_opcodes(PARSING_ENHANCE),
    FacilityDef::new(27, "027_MVCOS", "Move-with-Optional-Specifications Facility")
        .with_opcodes(MVCOS),
    FacilityDef::new(28, "028_TOD_CLOCK_STEER", "TOD-Clock-Steering Facility")
        .with_opcodes(TOD_CLOCK_STEER),
    FacilityDef::new(30, "030_ETF3_ENHANCEMENT", "ETF3-Enhancement Facility")
        .with_rule(DependencyRule::requires(&[22])),
    FacilityDef::new(31, "031_EXTRACT_CPU_TIME", "Extract-CPU-Time Facility")
        .with_opcodes(EXTRACT_CPU_TIME),
    FacilityDef::new(32, "032_CSSF", "Compare-and-Swap-and-Store Facility").with_opcodes(CSSF),
    FacilityDef::new(33, "033_CSSF2", "Compare-and-Swap-and-Store Facility 2")
        .with_rule(DependencyRule::requires(&[32])),
    FacilityDef::new(34, "034_GEN_INST_EXTN", "General-Instructions-Extension Facility")
        .with_opcodes(GEN_INST_EXTN),
    FacilityDef::new(35, "035_EXECUTE_EXTN", "Execute-Extensions Facility")
        .with_opcodes(EXECUTE_EXTN),
    FacilityDef::new(36, "036_ENH_MONITOR", "Enhanced-Monitor Facility"),
    FacilityDef::new(37, "037_FP_EXTENSION", "Floating-Point-Extension Facility")
        .with_rule(DependencyRule::requires(&[42]))
        .with_opcodes(FP_EXTENSION),
    FacilityDef::new(40, "040_LOAD_PROG_PARAM", "Load-Program-Parameter Facility")
        .with_opcodes(LOAD_PROG_PARAM),
    FacilityDef::new(41, "041_FPS_ENHANCEMENT", "Floating-Point-Support-Enhancement Facilities")
        .with_opcodes(FPS_ENHANCEMENT),
    FacilityDef::new(42, "042_DFP", "Decimal-Floating-Point Facility").with_opcodes(DFP),
    FacilityDef::new(43, "043_DFP_HPERF", "DFP Has High Performance")
        .with_rule(DependencyRule::requires(&[42])),
    FacilityDef::new(44, "044_PFPO", "PFPO Instruction")
        .with_rule(DependencyRule::requires(&[42]))
        .with_opcodes(PFPO),
    FacilityDef::new(45, "045_DISTINCT_OPERANDS", "Distinct-Operands Facility")
        .with_opcodes(DISTINCT_OPERANDS),
    FacilityDef::new(47, "047_CMPSC_ENH", "CMPSC-Enhancement Facility"),
    FacilityDef::new(
        48,
        "048_DFP_ZONE_CONV",
        "Decimal-Floating-Point Zoned-Conversion Facility",
    )
    .with_rule(DependencyRule::requires(&[42]))
    .with_opcodes(DFP_ZONE_CONV),
    FacilityDef::new(49, "049_EXECUTION_HINT", "Execution-Hint Facility")
        .with_opcodes(EXECUTION_HINT),
    FacilityDef::new(50, "050_CONSTRAINED_TX", "Constrained-Transactional-Execution Facility")
        .with_rule(DependencyRule::requires(&[73]))
        .with_opcodes(CONSTRAINED_TX),
    FacilityDef::new(51, "051_LOCAL_TLB_CLEARING", "Local-TLB-Clearing Facility"),
    FacilityDef::new(57, "057_MSA_EXTENSION_5", "Message-Security-Assist Extension 5")
        .with_rule(DependencyRule::requires(&[17]))
        .with_opcodes(MSA_EXTENSION_5),
    FacilityDef::new(73, "073_TRANSACTIONAL_EXEC", "Transactional-Execution Facility")
        .with_opcodes(TRANSACTIONAL_EXEC),
    FacilityDef::new(76, "076_MSA_EXTENSION_3", "Message-Security-Assist Extension 3")
        .with_rule(DependencyRule::requires(&[17])),
    FacilityDef::new(77, "077_MSA_EXTENSION_4", "Message-Security-Assist Extension 4")
        .with_rule(DependencyRule::requires(&[17]))
        .with_opcodes(MSA_EXTENSION_4),
    FacilityDef::new(78, "078_ENHANCED_DAT_2", "Enhanced-DAT Facility 2")
        .with_rule(DependencyRule::requires(&[8])),
    FacilityDef::new(80, "080_DFP_PACK_CONV", "Decimal-Floating-Point Packed-Conversion Facility")
        .with_rule(DependencyRule::requires(&[42]))
        .with_opcodes(DFP_PACK_CONV),
    FacilityDef::new(129, "129_ZVECTOR", "Vector Facility for z/Architecture")
        .with_opcodes(VECTOR),
    FacilityDef::new(135, "135_ZVECTOR_ENH_1", "Vector-Enhancements Facility 1")
        .with_rule(DependencyRule::requires(&[129]))
        .with_opcodes(VECTOR_ENH_1),
    FacilityDef::new(168, "168_ESA390_COMPAT_MODE", "ESA/390-Compatibility-Mode Facility")
        .with_rule(DependencyRule::incompatible(&[73])),
    FacilityDef::new(192, "192_HERC_DETECT_PGMINTLOOP", "Detect-Program-Interrupt-Loop"),
    FacilityDef::new(193, "193_HERC_HOST_RESOURCE_ACCESS", "Host Resource Access DIAGNOSE"),
    FacilityDef::new(194, "194_HERC_INTEGRATED_3270_CONSOLE", "Integrated 3270 (SYSG) Console"),
    FacilityDef::new(195, "195_HERC_MOVE_INVERSE", "Move Inverse Instruction")
        .with_opcodes(HERC_MOVE_INVERSE),
    FacilityDef::new(196, "196_HERC_PROBSTATE_DIAGF08", "Problem-State DIAGNOSE X'F08'"),
    FacilityDef::new(197, "197_HERC_SIGP_SETARCH_S370", "SIGP Set Architecture S/370 Support"),
    FacilityDef::new(198, "198_HERC_TCPIP_EXTENSION", "TCP/IP Extension")
        .with_opcodes(HERC_TCPIP_EXTENSION),
    FacilityDef::new(199, "199_HERC_TCPIP_PROB_STATE", "TCP/IP Problem-State Extension")
        .with_rule(DependencyRule::requires(&[198])),
    FacilityDef::new(200, "200_HERC_VIRTUAL_MACHINE", "Virtual-Machine Extension"),
    FacilityDef::new(201, "201_HERC_370_EXTENSION", "S/370 Instruction Extension")
        .with_bundle(S370_EXTENSION_MEMBERS),
];
