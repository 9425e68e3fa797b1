// Copyright @yucwang 2026

pub mod independent;
pub mod stratified;
