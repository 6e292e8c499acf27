//! Raw event tables for the AMD micro-architectures the service knows.
//!
//! Transcribed from the BIOS and Kernel Developer's Guides for families
//! 15h (Bulldozer and Steamroller) and 14h (Bobcat). Events above selector
//! 0xFF need the extended event-select bits that the raw encoding here does
//! not carry, so the x87 FLOP breakdown of family 15h is left out.

use super::EventDesc;

const fn e(name: &'static str, event: u8, umask: u8) -> EventDesc {
    EventDesc::new(name, event, umask)
}

/// Family 15h, models 00h-0Fh.
pub static BULLDOZER: &[EventDesc] = &[
    e("DISPATCHED_FPU_OPS.PIPE_0", 0x00, 0x01),
    e("DISPATCHED_FPU_OPS.PIPE_1", 0x00, 0x02),
    e("DISPATCHED_FPU_OPS.PIPE_2", 0x00, 0x04),
    e("DISPATCHED_FPU_OPS.PIPE_3", 0x00, 0x08),
    e("DISPATCHED_FPU_OPS.DUAL_PIPE.PIPE_0", 0x00, 0x10),
    e("DISPATCHED_FPU_OPS.DUAL_PIPE.PIPE_1", 0x00, 0x20),
    e("DISPATCHED_FPU_OPS.DUAL_PIPE.PIPE_2", 0x00, 0x40),
    e("DISPATCHED_FPU_OPS.DUAL_PIPE.PIPE_3", 0x00, 0x80),
    e("FP_SCHEDULER.EMPTY", 0x01, 0x00),
    e("FP_SCHEDULER.BUSY", 0x01, 0x00).inv(),
    e("RETIRED_SSEAVX_FLOPS.SP_ADDSUB", 0x03, 0x01),
    e("RETIRED_SSEAVX_FLOPS.SP_MUL", 0x03, 0x02),
    e("RETIRED_SSEAVX_FLOPS.SP_DIVSQRT", 0x03, 0x04),
    e("RETIRED_SSEAVX_FLOPS.SP_FMA", 0x03, 0x08),
    e("RETIRED_SSEAVX_FLOPS.DP_ADDSUB", 0x03, 0x10),
    e("RETIRED_SSEAVX_FLOPS.DP_MUL", 0x03, 0x20),
    e("RETIRED_SSEAVX_FLOPS.DP_DIVSQRT", 0x03, 0x40),
    e("RETIRED_SSEAVX_FLOPS.DP_FMA", 0x03, 0x80),
    e("MOVE_OPTIMIZATION.SSE_MOVE_OPS.ALL", 0x04, 0x01),
    e("MOVE_OPTIMIZATION.SSE_MOVE_OPS.ELIMINATED", 0x04, 0x02),
    e("MOVE_OPTIMIZATION.SCALAR_CANDIDATE_OPS.ALL", 0x04, 0x04),
    e("MOVE_OPTIMIZATION.SCALAR_CANDIDATE_OPS.OPTIMIZED", 0x04, 0x08),
    e("RETIRED_SERIALIZING_OPS.SSE_BOTTOM_EXECUTING_UOPS", 0x05, 0x01),
    e("RETIRED_SERIALIZING_OPS.SSE_MXCSR_MISPREDICTS", 0x05, 0x02),
    e("RETIRED_SERIALIZING_OPS.X87_BOTTOM_EXECUTING_UOPS", 0x05, 0x04),
    e("RETIRED_SERIALIZING_OPS.X87_CONTROL_WORD_MISPREDICTS", 0x05, 0x08),
    e("MEM_STALL_CYCLES.LDQ_FULL", 0x23, 0x01),
    e("MEM_STALL_CYCLES.STQ_FULL", 0x23, 0x02),
    e("LS_DISPATCH_OPS.LD", 0x29, 0x01),
    e("LS_DISPATCH_OPS.ST", 0x29, 0x02),
    e("LS_DISPATCH_OPS.LD_OP_ST", 0x29, 0x04),
    e("STLD_FORWARD_CANCELLED.LAYOUT_MISMATCH", 0x2A, 0x01),
    e("INSTRUCTION_FETCH_STALL", 0x87, 0x00),
    e("RETIRED_INSTRUCTIONS.ALL", 0xC0, 0x00),
    e("RETIRED_UOPS", 0xC1, 0x00),
    e("RETIRED_INSTRUCTIONS.SSE_AVX", 0xCB, 0x04),
    e("RETIRED_INSTRUCTIONS.MMX", 0xCB, 0x02),
    e("RETIRED_INSTRUCTIONS.X87", 0xCB, 0x01),
    e("DECODER_EMPTY", 0xD0, 0x00),
    e("DISPATCH_STALL.ALL", 0xD1, 0x00),
    e("MICROSEQUENCER_STALL.SERIALIZATION", 0xD3, 0x00),
    e("DISPATCH_STALL.RETIRE_QUEUE_FULL", 0xD5, 0x00),
    e("DISPATCH_STALL.INT_SCHEDULER_QUEUE_FULL", 0xD6, 0x00),
    e("DISPATCH_STALL.FP_SCHEDULER_QUEUE_FULL", 0xD7, 0x00),
    e("DISPATCH_STALL.LDQ_FULL", 0xD8, 0x00),
    e("MICROSEQUENCER_STALL.WAIT_ALL_QUIET", 0xD9, 0x00),
];

/// Family 15h, models 30h-3Fh.
pub static STEAMROLLER: &[EventDesc] = &[
    e("DISPATCHED_FPU_OPS.PIPE_0", 0x00, 0x01),
    e("DISPATCHED_FPU_OPS.PIPE_1", 0x00, 0x02),
    e("DISPATCHED_FPU_OPS.PIPE_2", 0x00, 0x04),
    e("DISPATCHED_FPU_OPS.DUAL_PIPE.PIPE_0", 0x00, 0x10),
    e("DISPATCHED_FPU_OPS.DUAL_PIPE.PIPE_1", 0x00, 0x20),
    e("DISPATCHED_FPU_OPS.DUAL_PIPE.PIPE_2", 0x00, 0x40),
    e("FP_SCHEDULER.EMPTY", 0x01, 0x00),
    e("FP_SCHEDULER.BUSY", 0x01, 0x00).inv(),
    e("RETIRED_SSEAVX_FLOPS.SP_ADDSUB", 0x03, 0x01),
    e("RETIRED_SSEAVX_FLOPS.SP_MUL", 0x03, 0x02),
    e("RETIRED_SSEAVX_FLOPS.SP_DIVSQRT", 0x03, 0x04),
    e("RETIRED_SSEAVX_FLOPS.SP_FMA", 0x03, 0x08),
    e("RETIRED_SSEAVX_FLOPS.DP_ADDSUB", 0x03, 0x10),
    e("RETIRED_SSEAVX_FLOPS.DP_MUL", 0x03, 0x20),
    e("RETIRED_SSEAVX_FLOPS.DP_DIVSQRT", 0x03, 0x40),
    e("RETIRED_SSEAVX_FLOPS.DP_FMA", 0x03, 0x80),
    e("MOVE_OPTIMIZATION.SSE_MOVE_OPS.ALL", 0x04, 0x01),
    e("MOVE_OPTIMIZATION.SSE_MOVE_OPS.ELIMINATED", 0x04, 0x02),
    e("MOVE_OPTIMIZATION.SCALAR_CANDIDATE_OPS.ALL", 0x04, 0x04),
    e("MOVE_OPTIMIZATION.SCALAR_CANDIDATE_OPS.OPTIMIZED", 0x04, 0x08),
    e("RETIRED_SERIALIZING_OPS.SSE_BOTTOM_EXECUTING_UOPS", 0x05, 0x01),
    e("RETIRED_SERIALIZING_OPS.SSE_MXCSR_MISPREDICTS", 0x05, 0x02),
    e("RETIRED_SERIALIZING_OPS.X87_BOTTOM_EXECUTING_UOPS", 0x05, 0x04),
    e("RETIRED_SERIALIZING_OPS.X87_CONTROL_WORD_MISPREDICTS", 0x05, 0x08),
    e("MEM_STALL_CYCLES.LDQ_FULL", 0x23, 0x01),
    e("MEM_STALL_CYCLES.STQ_FULL", 0x23, 0x02),
    e("LS_DISPATCH_OPS.LD", 0x29, 0x01),
    e("LS_DISPATCH_OPS.ST", 0x29, 0x02),
    e("LS_DISPATCH_OPS.LD_OP_ST", 0x29, 0x04),
    e("STLD_FORWARD_CANCELLED.LAYOUT_MISMATCH", 0x2A, 0x01),
    e("STLD_FORWARD_CANCELLED.TAG_MISMATCH", 0x2A, 0x02),
    e("RETIRED_INSTRUCTIONS.ALL", 0xC0, 0x00),
    e("RETIRED_INSTRUCTIONS.SSE_AVX", 0xCB, 0x04),
    e("RETIRED_INSTRUCTIONS.MMX", 0xCB, 0x02),
    e("RETIRED_INSTRUCTIONS.X87", 0xCB, 0x01),
    e("DISPATCH_STALL.ALL", 0xD1, 0x00),
    e("MICROSEQUENCER_STALL.SERIALIZATION", 0xD3, 0x00),
    e("DISPATCH_STALL.RETIRE_QUEUE_FULL", 0xD5, 0x00),
    e("DISPATCH_STALL.INT_SCHEDULER_QUEUE_FULL", 0xD6, 0x00),
    e("DISPATCH_STALL.FP_SCHEDULER_QUEUE_FULL", 0xD7, 0x00),
    e("DISPATCH_STALL.LDQ_FULL", 0xD8, 0x00),
    e("MICROSEQUENCER_STALL.WAIT_ALL_QUIET", 0xD9, 0x00),
];

/// Family 14h, models 00h-0Fh.
pub static BOBCAT: &[EventDesc] = &[
    e("DISPATCHED_FPU_OPS.PIPE_0", 0x00, 0x01),
    e("DISPATCHED_FPU_OPS.PIPE_1", 0x00, 0x02),
    e("FP_SCHEDULER.EMPTY", 0x01, 0x00),
    e("FP_SCHEDULER.BUSY", 0x01, 0x00).inv(),
    e("DISPATCHED_FAST_FLAG_FPU_OPS", 0x02, 0x00),
    e("RETIRED_SSEAVX_FLOPS.SP_ADDSUB", 0x03, 0x41),
    e("RETIRED_SSEAVX_FLOPS.SP_MUL", 0x03, 0x42),
    e("RETIRED_SSEAVX_FLOPS.SP_DIVSQRT", 0x03, 0x44),
    e("RETIRED_SSEAVX_FLOPS.DP_ADDSUB", 0x03, 0x48),
    e("RETIRED_SSEAVX_FLOPS.DP_MUL", 0x03, 0x50),
    e("RETIRED_SSEAVX_FLOPS.DP_DIVSQRT", 0x03, 0x60),
    e("RETIRED_MOVE_OPS.MERGING_MOVE", 0x04, 0x04),
    e("RETIRED_MOVE_OPS.NON_MERGING_MOVE", 0x04, 0x08),
    e("RETIRED_SERIALIZING_OPS.SSE_BOTTOM_EXECUTING_UOPS", 0x05, 0x01),
    e("RETIRED_SERIALIZING_OPS.SSE_MXCSR_MISPREDICTS", 0x05, 0x02),
    e("RETIRED_SERIALIZING_OPS.X87_BOTTOM_EXECUTING_UOPS", 0x05, 0x04),
    e("RETIRED_SERIALIZING_OPS.X87_CONTROL_WORD_MISPREDICTS", 0x05, 0x08),
    e("RETIRED_X87_FLOPS.ADDSUB", 0x11, 0x01),
    e("RETIRED_X87_FLOPS.MUL", 0x11, 0x02),
    e("RETIRED_X87_FLOPS.DIVSQRT", 0x11, 0x04),
    e("MEM_STALL_CYCLES.RSQ_FULL", 0x23, 0x00),
    e("STLD_FORWARD_CANCELLED.MISALIGNED", 0x2A, 0x04),
    e("STLD_FORWARD_CANCELLED.SIZE_MISMATCH", 0x2A, 0x02),
    e("STLD_FORWARD_CANCELLED.ADDRESS_MISMATCH", 0x2A, 0x01),
    e("PREFETCH_INSTRUCTIONS_DISPATCHED.LOAD", 0x4B, 0x01),
    e("PREFETCH_INSTRUCTIONS_DISPATCHED.STORE", 0x4B, 0x02),
    e("PREFETCH_INSTRUCTIONS_DISPATCHED.NTA", 0x4B, 0x04),
    e("INSTRUCTION_FETCH_STALL", 0x87, 0x00),
    e("RETIRED_INSTRUCTIONS", 0xC0, 0x00),
    e("RETIRED_UOPS", 0xC1, 0x00),
    e("RETIRED_BRANCH_INSTRUCTIONS", 0xC2, 0x00),
    e("RETIRED_MISPREDICTED_BRANCH_INSTRUCTIONS", 0xC3, 0x00),
    e("RETIRED_TAKEN_BRANCH_INSTRUCTIONS", 0xC4, 0x00),
    e("RETIRED_MISPREDICTED_TAKEN_BRANCH_INSTRUCTIONS", 0xC5, 0x00),
    e("RETIRED_FP_INSTRUCTIONS.SSE", 0xCB, 0x02),
    e("RETIRED_FP_INSTRUCTIONS.MMX_X87", 0xCB, 0x01),
];
