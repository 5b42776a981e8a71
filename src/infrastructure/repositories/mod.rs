pub mod pngs;
