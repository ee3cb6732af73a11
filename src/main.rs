fn main() {
    healthmate_lib::run()
}
