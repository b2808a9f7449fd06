// Lightweight HPS-to-FPGA bridge window
pub mod bridge {
    pub const BRIDGE_BASE: u64 = 0xFF20_0000;
    pub const BRIDGE_SPAN: usize = 0x1000;
    pub const DEVICE_PATH: &str = "/dev/mem";
}

pub mod registers {
    // Byte offsets of the PIO registers inside the bridge window
    pub const PIO_INSTRUCT_OFFSET: usize = 0x00;
    pub const PIO_ENABLE_OFFSET: usize = 0x10;
    pub const PIO_DATAOUT_OFFSET: usize = 0x20;
    pub const PIO_FLAGS_OFFSET: usize = 0x30;

    // Width of each register in bytes
    pub const REGISTER_WIDTH: usize = 4;

    // Smallest span that still covers every register
    pub const REGISTER_SPAN_MIN: usize = PIO_FLAGS_OFFSET + REGISTER_WIDTH;

    // Values written to ENABLE
    pub const ENABLE_LATCH: u32 = 0x1;
    pub const ENABLE_RELEASE: u32 = 0x0;
}

pub mod opcodes {
    // Instruction opcodes, bits [2:0] of INSTRUCT
    pub const OP_REFRESH_SCREEN: u32 = 0x0;
    pub const OP_LOAD: u32 = 0x1;
    pub const OP_STORE: u32 = 0x2;
    pub const OP_NHI_ALG: u32 = 0x3; // Zoom in, nearest neighbour
    pub const OP_PR_ALG: u32 = 0x4; // Zoom in, pixel repetition
    pub const OP_BA_ALG: u32 = 0x5; // Zoom out, block average
    pub const OP_NH_ALG: u32 = 0x6; // Zoom out, nearest neighbour
    pub const OP_RESET: u32 = 0x7;

    pub const OPCODE_MASK: u32 = 0x7;
}

pub mod operands {
    // LOAD / STORE operands
    pub const ADDRESS_SHIFT: u32 = 3;
    pub const ADDRESS_MASK: u32 = 0x1_FFFF; // 17 bits
    pub const DATA_SHIFT: u32 = 20;
    pub const DATA_MASK: u32 = 0xFF;
    pub const BANK_SELECT_BIT: u32 = 1 << 28; // LOAD only: 1 = pristine copy

    // Zoom operands
    pub const X_SHIFT: u32 = 3;
    pub const X_MASK: u32 = 0x3FF; // 10 bits
    pub const Y_SHIFT: u32 = 13;
    pub const Y_MASK: u32 = 0x1FF; // 9 bits
    pub const POSITIONED_BIT: u32 = 1 << 28;
    pub const HOLD_SCALE_BIT: u32 = 1 << 29;
}

pub mod flags {
    // Status bits read from FLAGS
    pub const FLAG_DONE_MASK: u32 = 0x1;
    pub const FLAG_ERROR_MASK: u32 = 0x2;
    pub const FLAG_ZMAX_MASK: u32 = 0x4;
    pub const FLAG_ZMIN_MASK: u32 = 0x8;
}

pub mod frame {
    // Frame buffer geometry of the coprocessor
    pub const FRAME_WIDTH: u32 = 320;
    pub const FRAME_HEIGHT: u32 = 240;
    pub const FRAME_PIXELS: u32 = FRAME_WIDTH * FRAME_HEIGHT;

    // Default pan step in pixels
    pub const PAN_STEP: u32 = 10;

    // Transfer progress is reported this many times per frame
    pub const PROGRESS_MILESTONES: u32 = 10;

    // BMP rows are padded to this many bytes
    pub const ROW_ALIGNMENT: u32 = 4;
}

// Completed commands kept for status queries
pub const HISTORY_DEPTH: usize = 8;
