mod connect_test;
