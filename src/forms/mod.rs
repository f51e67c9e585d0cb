pub mod swipes;
