// Static vocabularies, field names and unit conversion rules shared by every stage

pub mod constants;
pub mod units;
