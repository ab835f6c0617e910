pub mod headphones;
pub mod output_card;
