pub mod player_data;
