//! Raw event tables for the Intel micro-architectures the service knows.
//!
//! Transcribed from the Intel 64 and IA-32 Architectures Software
//! Developer's Manual, volume 3B, chapter 19, for the display models named
//! on each table. Only events useful for characterising straight-line
//! compute kernels are kept; memory-hierarchy events beyond L1 behavior are
//! deliberately absent because the argument buffers of every kernel fit in
//! cache.

use super::EventDesc;

const fn e(name: &'static str, event: u8, umask: u8) -> EventDesc {
    EventDesc::new(name, event, umask)
}

/// DisplayFamily_DisplayModel 06_3DH or 06_47H.
pub static BROADWELL: &[EventDesc] = &[
    e("LD_BLOCKS.STORE_FORWARD", 0x03, 0x02),
    e("LD_BLOCKS.NO_SR", 0x03, 0x08),
    e("MISALIGN_MEM_REF.LOADS", 0x05, 0x01),
    e("MISALIGN_MEM_REF.STORES", 0x05, 0x02),
    e("UOPS_ISSUED.ANY", 0x0E, 0x01),
    e("UOPS_ISSUED.FLAGS_MERGE", 0x0E, 0x10),
    e("UOPS_ISSUED.SLOW_LEA", 0x0E, 0x20),
    e("UOPS_ISSUED.SINGLE_MUL", 0x0E, 0x40),
    e("ARITH.FPU_DIV_ACTIVE", 0x14, 0x01),
    e("L1D.REPLACEMENT", 0x51, 0x01),
    e("MOVE_ELIMINATION.INT_NOT_ELIMINATED", 0x58, 0x04),
    e("MOVE_ELIMINATION.SIMD_NOT_ELIMINATED", 0x58, 0x08),
    e("MOVE_ELIMINATION.INT_ELIMINATED", 0x58, 0x01),
    e("MOVE_ELIMINATION.SIMD_ELIMINATED", 0x58, 0x02),
    e("RS_EVENTS.EMPTY_CYCLES", 0x5E, 0x01),
    e("IDQ.EMPTY", 0x79, 0x02),
    e("IDQ.MITE_UOPS", 0x79, 0x04),
    e("IDQ.DSB_UOPS", 0x79, 0x08),
    e("IDQ.MS_DSB_UOPS", 0x79, 0x10),
    e("IDQ.MS_MITE_UOPS", 0x79, 0x20),
    e("IDQ.MS_UOPS", 0x79, 0x30),
    e("IDQ.ALL_DSB_CYCLES_ANY_UOPS", 0x79, 0x18).cmask(1),
    e("IDQ.ALL_DSB_CYCLES_4_UOPS", 0x79, 0x18).cmask(4),
    e("IDQ.ALL_MITE_CYCLES_ANY_UOPS", 0x79, 0x18).cmask(1),
    e("IDQ.ALL_MITE_CYCLES_4_UOPS", 0x79, 0x18).cmask(4),
    e("IDQ.MITE_ALL_UOPS", 0x79, 0x3C),
    e("ICACHE.MISSES", 0x80, 0x02),
    e("ILD_STALL.LCP", 0x87, 0x01),
    e("IDQ_UOPS_NOT_DELIVERED.CORE", 0x9C, 0x01),
    e("UOPS_DISPATCHED_PORT.PORT_0", 0xA1, 0x01),
    e("UOPS_DISPATCHED_PORT.PORT_1", 0xA1, 0x02),
    e("UOPS_DISPATCHED_PORT.PORT_2", 0xA1, 0x04),
    e("UOPS_DISPATCHED_PORT.PORT_3", 0xA1, 0x08),
    e("UOPS_DISPATCHED_PORT.PORT_4", 0xA1, 0x10),
    e("UOPS_DISPATCHED_PORT.PORT_5", 0xA1, 0x20),
    e("UOPS_DISPATCHED_PORT.PORT_6", 0xA1, 0x40),
    e("UOPS_DISPATCHED_PORT.PORT_7", 0xA1, 0x80),
    e("RESOURCE_STALLS.ANY", 0xA2, 0x01),
    e("RESOURCE_STALLS.RS", 0xA2, 0x04),
    e("RESOURCE_STALLS.SB", 0xA2, 0x08),
    e("RESOURCE_STALLS.ROB", 0xA2, 0x10),
    e("LSD.UOPS", 0xA8, 0x01),
    e("DSB2MITE_SWITCHES.PENALTY_CYCLES", 0xAB, 0x02),
    e("UOPS_EXECUTED.THREAD", 0xB1, 0x01),
    e("UOPS_EXECUTED.THREAD.STALLS", 0xB1, 0x01).cmask(1),
    e("INST_RETIRED.ANY_P", 0xC0, 0x00),
    e("INST_RETIRED.X87", 0xC0, 0x02),
    e("OTHER_ASSISTS.AVX_TO_SSE", 0xC1, 0x08),
    e("OTHER_ASSISTS.SSE_TO_AVX", 0xC1, 0x10),
    e("OTHER_ASSISTS.ANY_WB_ASSIST", 0xC1, 0x40),
    e("UOPS_RETIRED.ALL", 0xC2, 0x01),
    e("UOPS_RETIRED.ALL.STALLS", 0xC2, 0x01).cmask(1).inv(),
    e("UOPS_RETIRED.RETIRE_SLOTS", 0xC2, 0x02),
    e("FP_ASSIST.X87_OUTPUT", 0xCA, 0x02),
    e("FP_ASSIST.X87_INPUT", 0xCA, 0x04),
    e("FP_ASSIST.SIMD_OUTPUT", 0xCA, 0x08),
    e("FP_ASSIST.SIMD_INPUT", 0xCA, 0x10),
    e("FP_ASSIST.ANY", 0xCA, 0x1E),
    e("ROB_MISC_EVENTS.LBR_INSERTS", 0xCC, 0x20),
];

/// DisplayFamily_DisplayModel 06_3CH, 06_45H or 06_46H.
pub static HASWELL: &[EventDesc] = &[
    e("MOVE_ELIMINATION.INT_NOT_ELIMINATED", 0x58, 0x04),
    e("MOVE_ELIMINATION.SIMD_NOT_ELIMINATED", 0x58, 0x08),
    e("MOVE_ELIMINATION.INT_ELIMINATED", 0x58, 0x01),
    e("MOVE_ELIMINATION.SIMD_ELIMINATED", 0x58, 0x02),
    e("UOPS_EXECUTED_PORT.PORT_0", 0xA1, 0x01),
    e("UOPS_EXECUTED_PORT.PORT_1", 0xA1, 0x02),
    e("UOPS_EXECUTED_PORT.PORT_2", 0xA1, 0x04),
    e("UOPS_EXECUTED_PORT.PORT_3", 0xA1, 0x08),
    e("UOPS_EXECUTED_PORT.PORT_4", 0xA1, 0x10),
    e("UOPS_EXECUTED_PORT.PORT_5", 0xA1, 0x20),
    e("UOPS_EXECUTED_PORT.PORT_6", 0xA1, 0x40),
    e("UOPS_EXECUTED_PORT.PORT_7", 0xA1, 0x80),
    e("UOPS_EXECUTED.CORE", 0xB1, 0x02),
    e("RESOURCE_STALLS.RS", 0xA2, 0x04),
    e("RESOURCE_STALLS.SB", 0xA2, 0x08),
    e("RESOURCE_STALLS.ROB", 0xA2, 0x10),
    e("OTHER_ASSISTS.AVX_TO_SSE", 0xC1, 0x08),
    e("OTHER_ASSISTS.SSE_TO_AVX", 0xC1, 0x10),
    e("OTHER_ASSISTS.ANY_WB_ASSIST", 0xC1, 0x40),
    e("UOPS_RETIRED.ALL", 0xC2, 0x01),
    e("UOPS_RETIRED.ALL.STALLS", 0xC2, 0x01).cmask(1).inv(),
    e("UOPS_RETIRED.ALL.ACTIVE", 0xC2, 0x01).cmask(1),
    e("UOPS_RETIRED.RETIRE_SLOTS", 0xC2, 0x02),
    e("LSD.UOPS", 0xA8, 0x01),
    e("UOPS_ISSUED.ANY", 0x0E, 0x01),
    e("UOPS_ISSUED.STALLS", 0x0E, 0x01).cmask(1).inv(),
    e("UOPS_ISSUED.FLAGS_MERGE", 0x0E, 0x10),
    e("UOPS_ISSUED.SLOW_LEA", 0x0E, 0x20),
    e("UOPS_ISSUED.SINGLE_MUL", 0x0E, 0x40),
    e("IDQ.EMPTY", 0x79, 0x02),
    e("IDQ.MITE_UOPS", 0x79, 0x04),
    e("IDQ.DSB_UOPS", 0x79, 0x08),
    e("IDQ.MS_DSB_UOPS", 0x79, 0x10),
    e("IDQ.MS_MITE_UOPS", 0x79, 0x20),
    e("IDQ.MS_UOPS", 0x79, 0x30),
    e("IDQ.ALL_DSB_CYCLES_ANY_UOPS", 0x79, 0x18).cmask(1),
    e("IDQ.ALL_DSB_CYCLES_4_UOPS", 0x79, 0x24).cmask(4),
    e("IDQ.ALL_MITE_CYCLES_ANY_UOPS", 0x79, 0x24).cmask(1),
    e("IDQ.ALL_MITE_CYCLES_4_UOPS", 0x79, 0x24).cmask(4),
    e("IDQ.MITE_ALL_UOPS", 0x79, 0x3C),
    e("ICACHE.MISSES", 0x80, 0x02),
    e("ILD_STALL.LCP", 0x87, 0x01),
    e("ILD_STALL.IQ_FULL", 0x87, 0x04),
    e("RS_EVENTS.EMPTY_CYCLES", 0x5E, 0x01),
];

/// DisplayFamily_DisplayModel 06_3AH.
pub static IVY_BRIDGE: &[EventDesc] = &[
    e("UOPS_ISSUED.ANY", 0x0E, 0x01),
    e("UOPS_ISSUED.FLAGS_MERGE", 0x0E, 0x10),
    e("UOPS_ISSUED.SLOW_LEA", 0x0E, 0x20),
    e("UOPS_ISSUED.SINGLE_MUL", 0x0E, 0x40),
    e("FP_COMP_OPS_EXE.X87", 0x10, 0x01),
    e("FP_COMP_OPS_EXE.SSE_FP_PACKED_DOUBLE", 0x10, 0x10),
    e("FP_COMP_OPS_EXE.SSE_FP_SCALAR_SINGLE", 0x10, 0x20),
    e("FP_COMP_OPS_EXE.SSE_PACKED_SINGLE", 0x10, 0x40),
    e("FP_COMP_OPS_EXE.SSE_SCALAR_DOUBLE", 0x10, 0x80),
    e("SIMD_FP_256.PACKED_SINGLE", 0x11, 0x01),
    e("SIMD_FP_256.PACKED_DOUBLE", 0x11, 0x01),
    e("UOPS_DISPATCHED_PORT.PORT_0", 0xA1, 0x01),
    e("UOPS_DISPATCHED_PORT.PORT_1", 0xA1, 0x02),
    e("UOPS_DISPATCHED_PORT.PORT_2", 0xA1, 0x0C),
    e("UOPS_DISPATCHED_PORT.PORT_3", 0xA1, 0x30),
    e("UOPS_DISPATCHED_PORT.PORT_4", 0xA1, 0x40),
    e("UOPS_DISPATCHED_PORT.PORT_5", 0xA1, 0x80),
    e("IDQ.EMPTY", 0x79, 0x02),
    e("IDQ.MITE_UOPS", 0x79, 0x04),
    e("IDQ.DSB_UOPS", 0x79, 0x08),
    e("IDQ.MS_DSB_UOPS", 0x79, 0x10),
    e("IDQ.MS_MITE_UOPS", 0x79, 0x20),
    e("IDQ.MS_UOPS", 0x79, 0x30),
    e("IDQ.ALL_DSB_CYCLES_ANY_UOPS", 0x79, 0x18).cmask(1),
    e("IDQ.ALL_DSB_CYCLES_4_UOPS", 0x79, 0x18).cmask(4),
    e("IDQ.ALL_MITE_CYCLES_ANY_UOPS", 0x79, 0x24).cmask(1),
    e("IDQ.ALL_MITE_CYCLES_4_UOPS", 0x79, 0x24).cmask(4),
    e("IDQ.MITE_ALL_UOPS", 0x79, 0x3C),
    e("ICACHE.IFETCH_STALL", 0x80, 0x04),
    e("ICACHE.MISSES", 0x80, 0x02),
    e("ILD_STALL.LCP", 0x87, 0x01),
    e("ILD_STALL.IQ_FULL", 0x87, 0x04),
    e("IDQ_UOPS_NOT_DELIVERED.CORE", 0x9C, 0x01),
    e("RESOURCE_STALLS.ANY", 0xA2, 0x01),
    e("RESOURCE_STALLS.RS", 0xA2, 0x04),
    e("RESOURCE_STALLS.SB", 0xA2, 0x08),
    e("RESOURCE_STALLS.ROB", 0xA2, 0x10),
    e("LSD.UOPS", 0xA8, 0x01),
    e("DSB2MITE_SWITCHES.COUNT", 0xAB, 0x01),
    e("DSB2MITE_SWITCHES.PENALTY_CYCLES", 0xAB, 0x02),
    e("DSB_FILL.EXCEED_DSB_LINES", 0xAC, 0x08),
    e("OTHER_ASSISTS.AVX_STORE", 0xC1, 0x08),
    e("OTHER_ASSISTS.AVX_TO_SSE", 0xC1, 0x10),
    e("OTHER_ASSISTS.SSE_TO_AVX", 0xC1, 0x20),
    e("OTHER_ASSISTS.WB", 0xC1, 0x80),
];

/// DisplayFamily_DisplayModel 06_1CH, 06_26H, 06_27H, 06_35H or 06_36H.
pub static ATOM: &[EventDesc] = &[
    e("STORE_FORWARDS.GOOD", 0x02, 0x81),
    e("SEGMENT_REG_LOADS.ANY", 0x06, 0x00),
    e("PREFETCH.PREFETCHT0", 0x07, 0x01),
    e("PREFETCH.SW_L2", 0x07, 0x06),
    e("PREFETCH.PREFETCHNTA", 0x07, 0x08),
    e("DATA_TLB_MISSES.DTLB_MISS", 0x08, 0x07),
    e("DATA_TLB_MISSES.DTLB_MISS_LD", 0x08, 0x05),
    e("DATA_TLB_MISSES.L0_DTLB_MISS_LD", 0x08, 0x09),
    e("DATA_TLB_MISSES.DTLB_MISS_ST", 0x08, 0x06),
    e("PAGE_WALKS.WALKS", 0x0C, 0x03).edge(),
    e("PAGE_WALKS.CYCLES", 0x0C, 0x03),
    e("X87_COMP_OPS_EXE.ANY.S", 0x10, 0x01),
    e("X87_COMP_OPS_EXE.ANY.AR", 0x10, 0x81),
    e("FP_ASSIST", 0x11, 0x01),
    e("FP_ASSIST.AR", 0x11, 0x01),
    e("MUL.S", 0x12, 0x01),
    e("MUL.AR", 0x12, 0x81),
    e("DIV.S", 0x13, 0x01),
    e("DIV.AR", 0x13, 0x81),
    e("CYCLES_DIV_BUSY", 0x14, 0x01),
    e("L1D_CACHE.LD", 0x40, 0x21),
    e("L1D_CACHE.ST", 0x40, 0x22),
    e("ICACHE.ACCESSES", 0x80, 0x03),
    e("ICACHE.MISSES", 0x80, 0x02),
    e("MACRO_INSTS.CISC_DECODED", 0xAA, 0x02),
    e("MACRO_INSTS.ALL_DECODED", 0xAA, 0x03),
    e("SIMD_UOPS_EXEC.S", 0xB0, 0x00),
    e("SIMD_UOPS_EXEC.AR", 0xB0, 0x80),
    e("SIMD_SAT_UOP_EXEC.S", 0xB1, 0x00),
    e("SIMD_SAT_UOP_EXEC.AR", 0xB1, 0x80),
    e("SIMD_UOP_TYPE_EXEC.MUL.S", 0xB3, 0x01),
    e("SIMD_UOP_TYPE_EXEC.MUL.AR", 0xB3, 0x81),
    e("SIMD_UOP_TYPE_EXEC.SHIFT.S", 0xB3, 0x02),
    e("SIMD_UOP_TYPE_EXEC.SHIFT.AR", 0xB3, 0x82),
    e("SIMD_UOP_TYPE_EXEC.PACK.S", 0xB3, 0x04),
    e("SIMD_UOP_TYPE_EXEC.PACK.AR", 0xB3, 0x84),
    e("SIMD_UOP_TYPE_EXEC.UNPACK.S", 0xB3, 0x08),
    e("SIMD_UOP_TYPE_EXEC.UNPACK.AR", 0xB3, 0x88),
    e("SIMD_UOP_TYPE_EXEC.LOGICAL.S", 0xB3, 0x10),
    e("SIMD_UOP_TYPE_EXEC.LOGICAL.AR", 0xB3, 0x90),
    e("SIMD_UOP_TYPE_EXEC.ARITHMETIC.S", 0xB3, 0x20),
    e("SIMD_UOP_TYPE_EXEC.ARITHMETIC.AR", 0xB3, 0xA0),
    e("INST_RETIRED.ANY_P", 0xC0, 0x00),
    e("UOPS_RETIRED.ANY", 0xC2, 0x10),
    e("SIMD_INST_RETIRED.PACKED_SINGLE", 0xC7, 0x01),
    e("SIMD_INST_RETIRED.SCALAR_SINGLE", 0xC7, 0x02),
    e("SIMD_INST_RETIRED.PACKED_DOUBLE", 0xC7, 0x04),
    e("SIMD_INST_RETIRED.SCALAR_DOUBLE", 0xC7, 0x08),
    e("SIMD_INST_RETIRED.VECTOR", 0xC7, 0x10),
    e("SIMD_COMP_INST_RETIRED.PACKED_SINGLE", 0xCA, 0x01),
    e("SIMD_COMP_INST_RETIRED.SCALAR_SINGLE", 0xCA, 0x02),
    e("SIMD_COMP_INST_RETIRED.PACKED_DOUBLE", 0xCA, 0x04),
    e("SIMD_COMP_INST_RETIRED.SCALAR_DOUBLE", 0xCA, 0x08),
    e("SIMD_ASSIST", 0xCD, 0x00),
    e("SIMD_INSTR_RETIRED", 0xCE, 0x00),
    e("SIMD_SAT_INSTR_RETIRED", 0xCD, 0x00),
];
