pub mod stage1_align;
pub mod stage2_interpolate;
pub mod stage3_select;
pub mod stage4_match;
pub mod stage5_evaluate;
pub mod stage6_gauntlet;
