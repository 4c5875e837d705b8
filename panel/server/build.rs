fn main() {
    led_panel_build::frontend("led-frontend", "../frontend", "assets");
}
